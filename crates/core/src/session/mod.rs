//! Transport abstraction for talking to the tracker.
//!
//! Movies never reach for a global session: the transport is handed to
//! them at construction as an `Arc<dyn Transport>`, which keeps the
//! resolver testable with [`crate::testing::MockTransport`].

mod http;

pub use http::HttpSession;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while retrieving a page or endpoint from the tracker.
#[derive(Debug, Error)]
pub enum SessionError {
    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Tracker answered with a non-success status.
    #[error("Tracker returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Body was expected to be a JSON object but was not.
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    /// Client could not be constructed.
    #[error("Session not configured: {0}")]
    NotConfigured(String),
}

/// Body of a successful response. Non-success statuses never get this far.
#[derive(Debug, Clone)]
pub struct Response {
    /// Raw body text.
    pub text: String,
}

impl Response {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Decode the body as a JSON object.
    pub fn json(&self) -> Result<Map<String, Value>, SessionError> {
        let value: Value = serde_json::from_str(&self.text)
            .map_err(|e| SessionError::InvalidJson(e.to_string()))?;

        match value {
            Value::Object(map) => Ok(map),
            other => Err(SessionError::InvalidJson(format!(
                "expected an object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Trait for tracker transports.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Site root used to build absolute links (no trailing slash).
    fn base_url(&self) -> &str;

    /// GET `path` (relative to the site root) with the given query parameters.
    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Response, SessionError>;
}
