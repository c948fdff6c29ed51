//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use todo_core::credentials::DEFAULT_CREDENTIALS_VAR;
use todo_core::IdPolicy;

use crate::api::ResponseStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Flat JSON file, rewritten on every mutation
    File,
    /// Hosted document collection
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IdPolicyArg {
    /// Persisted counter; ids are never reused
    Counter,
    /// Collection length + 1; ids are reused after deletions
    Length,
}

impl From<IdPolicyArg> for IdPolicy {
    fn from(arg: IdPolicyArg) -> Self {
        match arg {
            IdPolicyArg::Counter => IdPolicy::Counter,
            IdPolicyArg::Length => IdPolicy::Length,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "todo-server", version, about = "Multi-user todo list web service")]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "TODO_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Persistence backend
    #[arg(long, env = "TODO_BACKEND", value_enum, default_value_t = Backend::File)]
    pub backend: Backend,

    /// JSON file used by the file backend
    #[arg(long, env = "TODO_DATA_FILE", default_value = "todos.json")]
    pub data_file: PathBuf,

    /// Id allocation for the file backend
    #[arg(long, env = "TODO_ID_POLICY", value_enum, default_value_t = IdPolicyArg::Counter)]
    pub id_policy: IdPolicyArg,

    /// Collection name used by the document backend
    #[arg(long, env = "TODO_COLLECTION", default_value = "todos")]
    pub collection: String,

    /// Environment variable holding the document backend credentials (JSON)
    #[arg(long, env = "TODO_CREDENTIALS_VAR", default_value = DEFAULT_CREDENTIALS_VAR)]
    pub credentials_var: String,

    /// Response shapes; defaults to `legacy` for the file backend and `rest`
    /// for the document backend
    #[arg(long, env = "TODO_RESPONSE_STYLE", value_enum)]
    pub response_style: Option<ResponseStyle>,
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn response_style(&self) -> ResponseStyle {
        self.response_style.unwrap_or(match self.backend {
            Backend::File => ResponseStyle::Legacy,
            Backend::Document => ResponseStyle::Rest,
        })
    }
}
