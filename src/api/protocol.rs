//! Wire types for `/api/chat` and `/api/agents`.

use crate::config::Language;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Trimmed user text
    pub message: String,

    pub language: Language,

    /// Widget session, for server-side correlation only
    pub session_id: String,

    /// Agent the user picked; the backend auto-routes when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
}

/// Body of a `POST /api/chat` answer
///
/// Every field is optional: the controller decides what to render from
/// whichever subset arrived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// Suggested follow-up questions
    #[serde(
        default,
        rename = "quickReplies",
        skip_serializing_if = "Option::is_none"
    )]
    pub quick_replies: Option<Vec<String>>,

    /// Server-side processing time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,

    /// Backend-reported failure text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            ..Default::default()
        }
    }

    /// Reply text, if present and not blank
    pub fn response_text(&self) -> Option<&str> {
        self.response
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// One entry of `GET /api/agents`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    #[serde(rename = "type")]
    pub agent_type: String,

    pub name: String,

    #[serde(default)]
    pub description: String,
}

/// Body of `GET /api/agents`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentListing {
    pub agents: Vec<AgentDescriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_agents: Option<usize>,
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,

    /// Server clock, seconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
