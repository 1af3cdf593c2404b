//! Chat backend collaborator
//!
//! The widget talks to one remote service: `POST /api/chat` for message
//! exchange, `GET /api/agents` for the agent listing and `GET /api/health`
//! for a liveness check. The controller only
//! sees the [`ChatBackend`] trait so tests can swap the transport out.

pub mod http;
pub mod protocol;

pub use http::HttpBackend;
pub use protocol::{AgentDescriptor, AgentListing, ChatReply, ChatRequest, HealthStatus};

use async_trait::async_trait;
use thiserror::Error;

/// Why a single exchange with the backend failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// Backend answered, but not with 2xx
    #[error("Backend returned HTTP {0}")]
    Status(u16),

    /// Request never completed (DNS, refused connection, reset, ...)
    #[error("Transport failure: {0}")]
    Transport(String),

    /// 2xx answer whose body is not the expected JSON
    #[error("Malformed response body: {0}")]
    Malformed(String),
}

/// Remote chat service
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Submit one user message and wait for the reply
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ExchangeError>;

    /// Fetch the agents the backend can route to
    async fn list_agents(&self) -> Result<Vec<AgentDescriptor>, ExchangeError>;

    /// Ask the backend whether it is up
    async fn health(&self) -> Result<HealthStatus, ExchangeError>;
}
