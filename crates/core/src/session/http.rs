//! reqwest-backed tracker session.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{Response, SessionError, Transport};
use crate::config::TrackerConfig;

/// Production transport.
pub struct HttpSession {
    client: Client,
    base_url: String,
}

impl HttpSession {
    /// Create a new session from tracker configuration.
    pub fn new(config: &TrackerConfig) -> Result<Self, SessionError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(SessionError::NotConfigured(
                "tracker base URL is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(config.user_agent.clone())
            .cookie_store(true)
            .build()?;

        Ok(Self { client, base_url })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl std::fmt::Debug for HttpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSession")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl Transport for HttpSession {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Response, SessionError> {
        let url = self.url_for(path);
        debug!(url = %url, params = ?params, "Tracker GET");

        let response = self.client.get(&url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let text = response.text().await?;
        Ok(Response::new(text))
    }
}
