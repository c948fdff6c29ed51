//! `DocumentCollection` over the hosted document API.
//!
//! `DocumentClient` builds and parses; this type executes the round-trip with
//! a blocking ureq agent on tokio's blocking pool. One instance is created at
//! startup and shared by every request.

use async_trait::async_trait;
use serde_json::{Map, Value};
use todo_core::{Credentials, Document, DocumentClient, HttpMethod, HttpRequest, HttpResponse};
use tracing::{debug, warn};

use super::DocumentCollection;
use crate::error::{Result, StoreError};

pub struct RemoteCollection {
    client: DocumentClient,
    agent: ureq::Agent,
}

impl RemoteCollection {
    pub fn new(client: DocumentClient) -> Self {
        // statuses are data; DocumentClient interprets them
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { client, agent }
    }

    pub fn from_credentials(credentials: &Credentials, collection: &str) -> Self {
        Self::new(DocumentClient::new(credentials, collection))
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?
    }
}

fn execute_blocking(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse> {
    debug!(method = request.method.as_str(), url = %request.url, "document request");
    let result = match request.method {
        HttpMethod::Get | HttpMethod::Delete => {
            let mut builder = match request.method {
                HttpMethod::Get => agent.get(&request.url),
                _ => agent.delete(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        }
        HttpMethod::Post | HttpMethod::Patch => {
            let mut builder = match request.method {
                HttpMethod::Post => agent.post(&request.url),
                _ => agent.patch(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match request.body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        }
    };

    let mut response = result.map_err(|e| {
        warn!(url = %request.url, error = %e, "document backend unreachable");
        StoreError::Transport(e.to_string())
    })?;
    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| StoreError::Transport(e.to_string()))?;
    Ok(HttpResponse::new(status, body))
}

#[async_trait]
impl DocumentCollection for RemoteCollection {
    async fn get(&self, id: &str) -> Result<Option<Document>> {
        let response = self.execute(self.client.build_get(id)).await?;
        Ok(self.client.parse_get(response)?)
    }

    async fn query(&self, field: &str, value: &str) -> Result<Vec<Document>> {
        let response = self.execute(self.client.build_query(field, value)).await?;
        Ok(self.client.parse_query(response)?)
    }

    async fn list(&self) -> Result<Vec<Document>> {
        let response = self.execute(self.client.build_list()).await?;
        Ok(self.client.parse_list(response)?)
    }

    async fn add(&self, fields: Map<String, Value>) -> Result<String> {
        let response = self.execute(self.client.build_add(&fields)?).await?;
        Ok(self.client.parse_add(response)?.id)
    }

    async fn update(&self, id: &str, patch: Map<String, Value>) -> Result<()> {
        let response = self.execute(self.client.build_update(id, &patch)?).await?;
        self.client.parse_update(response)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self.execute(self.client.build_delete(id)).await?;
        Ok(self.client.parse_delete(response)?)
    }
}
