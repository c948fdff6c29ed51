//! Credentials for the hosted document backend.
//!
//! Supplied once at startup as a JSON payload in an environment variable.

use std::fmt;

use serde::Deserialize;

use crate::error::CredentialsError;

pub const DEFAULT_CREDENTIALS_VAR: &str = "TODO_DOCSTORE_CREDENTIALS";

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub endpoint: String,
    pub project_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Credentials {
    pub fn from_json(raw: &str) -> Result<Self, CredentialsError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_env(var: &str) -> Result<Self, CredentialsError> {
        let raw = std::env::var(var).map_err(|_| CredentialsError::Missing(var.to_string()))?;
        Self::from_json(&raw)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
