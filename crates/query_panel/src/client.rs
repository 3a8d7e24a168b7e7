//! HTTP client for the query backend: `POST /query`, `GET /tables`,
//! `GET /tables/{name}/schema`.

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::messages::{BackendErrorMessage, QueryRequest, QueryResponse, TableInfo};

/// Errors from a backend exchange. Every failure of the source's single
/// `fetch` gets its own variant here.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Connection settings plus a pooled `reqwest::Client`. Cheap to clone.
#[derive(Debug, Clone)]
pub struct QueryClient {
    http: reqwest::Client,
    base: Url,
}

impl QueryClient {
    /// Build a client for the backend at `base_url` (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Send `query` verbatim (empty included) and decode the reply.
    pub async fn query(&self, query: &str) -> Result<QueryResponse, ClientError> {
        let url = self.endpoint(&["query"])?;
        tracing::debug!(%url, len = query.len(), "sending query");
        let response = self
            .http
            .post(url)
            .json(&QueryRequest::new(query))
            .send()
            .await?;
        decode(response).await
    }

    /// List the tables known to the backend.
    pub async fn list_tables(&self) -> Result<Vec<TableInfo>, ClientError> {
        let url = self.endpoint(&["tables"])?;
        tracing::debug!(%url, "listing tables");
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    /// Column metadata for `table`, as returned by the backend.
    pub async fn table_schema(&self, table: &str) -> Result<serde_json::Value, ClientError> {
        let url = self.endpoint(&["tables", table, "schema"])?;
        tracing::debug!(%url, "fetching table schema");
        let response = self.http.get(url).send().await?;
        let value: serde_json::Value = decode(response).await?;
        match BackendErrorMessage::from_json(&value) {
            Some(message) => Err(ClientError::Backend(message)),
            None => Ok(value),
        }
    }

    /// Append percent-encoded `segments` to the base URL's path. Dot segments
    /// would be collapsed by the URL parser, so they are refused.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        if let Some(dot) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(ClientError::InvalidUrl(format!(
                "path segment {:?} is not allowed",
                dot
            )));
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        tracing::warn!(%status, "backend returned non-success status");
        return Err(ClientError::Status { status, body });
    }
    serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
}
