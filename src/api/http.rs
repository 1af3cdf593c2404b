//! HTTP implementation of [`ChatBackend`] over reqwest.

use super::protocol::{AgentDescriptor, AgentListing, ChatReply, ChatRequest, HealthStatus};
use super::{ChatBackend, ExchangeError};
use crate::config::WidgetConfig;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Talks to the chat service over plain HTTP+JSON
///
/// No timeout is configured: a hung request keeps the exchange pending until
/// the transport itself gives up.
pub struct HttpBackend {
    client: reqwest::Client,
    chat_url: String,
    agents_url: String,
    health_url: String,
}

impl HttpBackend {
    /// Create a backend for the endpoints named in `config`
    pub fn new(config: &WidgetConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a backend reusing an existing client
    pub fn with_client(client: reqwest::Client, config: &WidgetConfig) -> Self {
        Self {
            client,
            chat_url: config.chat_url(),
            agents_url: config.agents_url(),
            health_url: config.health_url(),
        }
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ExchangeError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| ExchangeError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ExchangeError> {
        log::debug!(
            "POST {} (language={}, agent={:?})",
            self.chat_url,
            request.language,
            request.agent_type
        );

        let response = self
            .client
            .post(&self.chat_url)
            .json(request)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        Self::read_json(response).await
    }

    async fn list_agents(&self) -> Result<Vec<AgentDescriptor>, ExchangeError> {
        let response = self
            .client
            .get(&self.agents_url)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        let listing: AgentListing = Self::read_json(response).await?;
        Ok(listing.agents)
    }

    async fn health(&self) -> Result<HealthStatus, ExchangeError> {
        let response = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        let health: HealthStatus = Self::read_json(response).await?;
        log::debug!("GET {} -> {}", self.health_url, health.status);
        Ok(health)
    }
}
