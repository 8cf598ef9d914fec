//! Mock tracker transport for testing.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::session::{Response, SessionError, Transport};

/// A recorded request for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Whether this was a request for the JSON endpoint.
    pub fn is_json(&self) -> bool {
        self.params.iter().any(|(k, v)| k == "json" && v == "1")
    }
}

/// Mock implementation of the Transport trait.
///
/// Serves one canned JSON body (requests carrying `json=1`) and one canned
/// HTML body (everything else), and records every request.
///
/// # Example
///
/// ```rust,ignore
/// use popcorn_core::testing::{fixtures, MockTransport};
///
/// let transport = Arc::new(
///     MockTransport::new().with_json(fixtures::movie_json("42", vec![])),
/// );
/// let mut movie = Movie::new("42", transport.clone());
/// movie.get("ImdbId").await?;
/// assert_eq!(transport.json_requests(), 1);
/// ```
pub struct MockTransport {
    base_url: String,
    json_body: Option<String>,
    html_body: Option<String>,
    requests: Mutex<Vec<RecordedRequest>>,
    next_error: Mutex<Option<SessionError>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("base_url", &self.base_url)
            .field("json_body", &self.json_body.is_some())
            .field("html_body", &self.html_body.is_some())
            .field("requests", &"<requests>")
            .finish()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a mock with no canned bodies.
    pub fn new() -> Self {
        Self {
            base_url: "https://tracker.test".to_string(),
            json_body: None,
            html_body: None,
            requests: Mutex::new(Vec::new()),
            next_error: Mutex::new(None),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Serve `body` for JSON endpoint requests.
    pub fn with_json(mut self, body: Value) -> Self {
        self.json_body = Some(body.to_string());
        self
    }

    /// Serve raw text for JSON endpoint requests (for malformed bodies).
    pub fn with_json_text(mut self, body: impl Into<String>) -> Self {
        self.json_body = Some(body.into());
        self
    }

    /// Serve `body` for page requests.
    pub fn with_html(mut self, body: impl Into<String>) -> Self {
        self.html_body = Some(body.into());
        self
    }

    /// Make the next request fail with `error`.
    pub fn fail_next(&self, error: SessionError) {
        *lock(&self.next_error) = Some(error);
    }

    /// All requests made so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Number of JSON endpoint requests made so far.
    pub fn json_requests(&self) -> usize {
        lock(&self.requests).iter().filter(|r| r.is_json()).count()
    }

    /// Number of page requests made so far.
    pub fn html_requests(&self) -> usize {
        lock(&self.requests).iter().filter(|r| !r.is_json()).count()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Transport for MockTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Response, SessionError> {
        let request = RecordedRequest {
            path: path.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        let is_json = request.is_json();
        lock(&self.requests).push(request);

        if let Some(error) = lock(&self.next_error).take() {
            return Err(error);
        }

        let body = if is_json {
            &self.json_body
        } else {
            &self.html_body
        };
        match body {
            Some(text) => Ok(Response::new(text.clone())),
            None => Err(SessionError::Status {
                status: 404,
                message: format!("no canned response for {}", path),
            }),
        }
    }
}
