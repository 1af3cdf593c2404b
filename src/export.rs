//! Chat History Export
//!
//! Serializes a widget session into the downloadable
//! `chat-history-<session>.json` artifact.

use crate::config::Language;
use crate::error::{Result, WidgetError};
use crate::widget::message::{Message, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Snapshot of one widget session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryExport {
    pub session_id: SessionId,

    pub language: Language,

    /// Agent the conversation was held with
    pub agent: String,

    /// Full message list in display order
    pub messages: Vec<Message>,

    pub exported_at: DateTime<Utc>,
}

impl HistoryExport {
    pub fn new(
        session_id: SessionId,
        language: Language,
        agent: String,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            session_id,
            language,
            agent,
            messages,
            exported_at: Utc::now(),
        }
    }

    /// Download file name for this session
    pub fn file_name(&self) -> String {
        format!("chat-history-{}.json", self.session_id)
    }

    /// Pretty-printed JSON document
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| WidgetError::ExportFailed(format!("Failed to serialize history: {}", e)))
    }

    /// Write the artifact into `dir`, creating it if needed
    pub async fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            WidgetError::ExportFailed(format!(
                "Failed to create export directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let path = dir.join(self.file_name());
        let json = self.to_json()?;
        tokio::fs::write(&path, json).await.map_err(|e| {
            WidgetError::ExportFailed(format!("Failed to write {}: {}", path.display(), e))
        })?;

        log::info!(
            "Exported {} messages to {}",
            self.messages.len(),
            path.display()
        );
        Ok(path)
    }
}
