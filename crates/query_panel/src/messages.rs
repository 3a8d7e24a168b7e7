//! HTTP message types for the query backend. Client ↔ server JSON.

use serde::{Deserialize, Serialize};

/// Client → server: body of `POST /query`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
}

impl<'a> QueryRequest<'a> {
    pub fn new(query: &'a str) -> Self {
        Self { query }
    }
}

/// Server → client: response to `POST /query`.
///
/// Only `answer` and `message` are read; anything else the backend sends
/// (`refined_query`, `query_hints`, `status`, ...) is ignored. Both fields
/// accept any JSON value, not just strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl QueryResponse {
    /// Text shown in the answer area: `answer` unless it is absent or falsy
    /// (`null`, `false`, `0`, `""`), else `message`, else the empty string.
    pub fn display_text(&self) -> String {
        match &self.answer {
            Some(answer) if is_truthy(answer) => render_value(answer),
            _ => self.message.as_ref().map(render_value).unwrap_or_default(),
        }
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

/// Strings as-is, `null` and booleans as nothing, anything else as JSON.
fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null | serde_json::Value::Bool(_) => String::new(),
        other => other.to_string(),
    }
}

/// Server → client: one entry of `GET /tables`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableInfo {
    pub table_name: String,
    #[serde(default)]
    pub table_description: Option<String>,
}

/// Server → client: lookup failure reported with a 200 status.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendErrorMessage {
    pub error: String,
}

impl BackendErrorMessage {
    /// Returns the backend's error text when `value` is an `{"error": ...}` object.
    pub fn from_json(value: &serde_json::Value) -> Option<String> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value::<BackendErrorMessage>(value.clone())
            .ok()
            .map(|m| m.error)
    }
}
