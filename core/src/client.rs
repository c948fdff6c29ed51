//! Stateless request builder and response parser for the document API.
//!
//! # Design
//! `DocumentClient` holds the collection's base URL and the API key, nothing
//! else. Each collection operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the round-trip.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::credentials::Credentials;
use crate::error::BackendError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Document;

/// Unreserved characters (RFC 3986) stay as they are; everything else is
/// escaped in path segments and query values.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Client for one collection of the remote document API.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    base_url: String,
    api_key: Option<String>,
}

impl DocumentClient {
    pub fn new(credentials: &Credentials, collection: &str) -> Self {
        Self {
            base_url: format!(
                "{}/projects/{}/collections/{}/documents",
                credentials.endpoint.trim_end_matches('/'),
                encode(&credentials.project_id),
                encode(collection),
            ),
            api_key: credentials.api_key.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_add(&self, fields: &Map<String, Value>) -> Result<HttpRequest, BackendError> {
        let body = serde_json::to_string(fields).map_err(|e| BackendError::Serialization(e.to_string()))?;
        Ok(self.request(HttpMethod::Post, self.base_url.clone(), Some(body)))
    }

    pub fn build_list(&self) -> HttpRequest {
        self.request(HttpMethod::Get, self.base_url.clone(), None)
    }

    pub fn build_query(&self, field: &str, value: &str) -> HttpRequest {
        let url = format!(
            "{}?field={}&value={}",
            self.base_url,
            encode(field),
            encode(value)
        );
        self.request(HttpMethod::Get, url, None)
    }

    pub fn build_get(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, self.document_url(id), None)
    }

    pub fn build_update(&self, id: &str, patch: &Map<String, Value>) -> Result<HttpRequest, BackendError> {
        let body = serde_json::to_string(patch).map_err(|e| BackendError::Serialization(e.to_string()))?;
        Ok(self.request(HttpMethod::Patch, self.document_url(id), Some(body)))
    }

    pub fn build_delete(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, self.document_url(id), None)
    }

    pub fn parse_add(&self, response: HttpResponse) -> Result<Document, BackendError> {
        check_status(&response, 201)?;
        decode(&response.body)
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Document>, BackendError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_query(&self, response: HttpResponse) -> Result<Vec<Document>, BackendError> {
        self.parse_list(response)
    }

    /// A 404 is an absent document, not an error.
    pub fn parse_get(&self, response: HttpResponse) -> Result<Option<Document>, BackendError> {
        match check_status(&response, 200) {
            Ok(()) => decode(&response.body).map(Some),
            Err(BackendError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<Document, BackendError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), BackendError> {
        check_status(&response, 204)
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, encode(id))
    }

    fn request(&self, method: HttpMethod, url: String, body: Option<String>) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(key) = &self.api_key {
            headers.push(("authorization".to_string(), format!("Bearer {key}")));
        }
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }
}

fn encode(component: &str) -> String {
    utf8_percent_encode(component, COMPONENT).to_string()
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| BackendError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the matching `BackendError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), BackendError> {
    match response.status {
        status if status == expected => Ok(()),
        401 | 403 => Err(BackendError::Unauthorized),
        404 => Err(BackendError::NotFound),
        status => Err(BackendError::Http {
            status,
            body: response.body.clone(),
        }),
    }
}
