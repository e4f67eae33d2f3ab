//! REST access to the session listing

use std::time::Duration;

use async_trait::async_trait;
use helix_core::config::ApiConfig;
use helix_core::Session;
use reqwest::Client;
use tracing::debug;

use crate::error::{Result, SyncError};

/// Source of the full session list
#[async_trait]
pub trait SessionsApi: Send + Sync {
    /// Fetch every session visible to the holder of `token`
    async fn list_sessions(&self, token: &str) -> Result<Vec<Session>>;
}

/// [`SessionsApi`] backed by the helix HTTP API
pub struct HttpSessionsApi {
    client: Client,
    base_url: String,
    sessions_path: String,
}

impl HttpSessionsApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            sessions_path: config.sessions_path.clone(),
        })
    }

    /// Full URL of the listing endpoint
    pub fn sessions_url(&self) -> String {
        format!("{}{}", self.base_url, self.sessions_path)
    }
}

#[async_trait]
impl SessionsApi for HttpSessionsApi {
    async fn list_sessions(&self, token: &str) -> Result<Vec<Session>> {
        let url = self.sessions_url();
        debug!("Fetching sessions from {}", url);

        let mut request = self.client.get(&url);
        if !token.is_empty() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Api {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Vec<Session>>().await?)
    }
}
