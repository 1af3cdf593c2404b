//! Widget Controller
//!
//! Owns the widget's UI state (open/closed, language, agent, message list)
//! and drives one request/response exchange at a time against the chat
//! backend. All rendering goes through the injected [`WidgetView`].

use super::message::{Message, SessionId};
use super::view::WidgetView;
use crate::api::{ChatBackend, ChatReply, ChatRequest, ExchangeError};
use crate::config::{Agent, Language, WidgetConfig};
use crate::error::{Result, WidgetError};
use crate::export::HistoryExport;
use std::sync::Arc;

/// Per-exchange state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    Awaiting,
}

/// A request issued by [`WidgetController::begin_send`] that has not settled
///
/// Hand it back to [`WidgetController::complete_send`] together with the
/// backend outcome.
#[derive(Debug)]
pub struct PendingExchange {
    request: ChatRequest,
    conversation: u64,
}

impl PendingExchange {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

/// The embeddable chat widget
pub struct WidgetController<V: WidgetView> {
    config: WidgetConfig,
    backend: Arc<dyn ChatBackend>,
    view: V,
    session_id: SessionId,
    is_open: bool,
    language: Language,
    agent: Agent,
    messages: Vec<Message>,
    exchange: ExchangeState,
    // Bumped whenever the message list is reset; replies for an older
    // conversation are dropped.
    conversation: u64,
}

impl<V: WidgetView> WidgetController<V> {
    /// Mount the widget and greet with the default agent's welcome message
    pub fn new(config: WidgetConfig, backend: Arc<dyn ChatBackend>, mut view: V) -> Result<Self> {
        config.validate()?;

        let agent = config
            .agents
            .get(&config.default_agent)
            .cloned()
            .ok_or_else(|| {
                WidgetError::InvalidConfig(format!("unknown agent '{}'", config.default_agent))
            })?;

        let session_id = SessionId::generate();
        let language = config.language;
        let welcome = agent.welcome.get(language).to_string();

        view.mount(&config);
        view.set_open(config.start_open);
        view.set_agent_label(&agent.label);
        view.set_welcome_text(&welcome);
        view.set_quick_replies(&config.quick_replies);
        view.set_send_enabled(true);

        log::info!(
            "Chat widget mounted (session={}, agent={}, language={})",
            session_id,
            agent.id,
            language
        );

        let mut controller = Self {
            is_open: config.start_open,
            config,
            backend,
            view,
            session_id,
            language,
            agent,
            messages: Vec::new(),
            exchange: ExchangeState::Idle,
            conversation: 0,
        };
        if controller.is_open {
            controller.view.focus_input();
        }
        controller.push(Message::welcome(welcome));

        Ok(controller)
    }

    // ===== ACCESSORS =====

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn exchange_state(&self) -> ExchangeState {
        self.exchange
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Shared handle to the backend, for hosts that drive the request themselves
    pub fn backend(&self) -> Arc<dyn ChatBackend> {
        Arc::clone(&self.backend)
    }

    // ===== VISIBILITY =====

    pub fn open(&mut self) {
        if self.is_open {
            return;
        }
        self.is_open = true;
        self.view.set_open(true);
        self.view.focus_input();
    }

    pub fn close(&mut self) {
        if !self.is_open {
            return;
        }
        self.is_open = false;
        self.view.set_open(false);
    }

    pub fn toggle(&mut self) {
        if self.is_open {
            self.close();
        } else {
            self.open();
        }
    }

    // ===== AGENT & LANGUAGE =====

    /// Start a fresh conversation with another agent; unknown ids are ignored
    pub fn switch_agent(&mut self, id: &str) {
        if id == self.agent.id {
            return;
        }
        let Some(agent) = self.config.agents.get(id).cloned() else {
            log::debug!("Ignoring switch to unknown agent '{}'", id);
            return;
        };

        log::info!("Switching agent {} -> {}", self.agent.id, agent.id);
        let welcome = agent.welcome.get(self.language).to_string();
        self.agent = agent;

        self.reset_messages();
        self.view.set_agent_label(&self.agent.label);
        self.view.set_welcome_text(&welcome);
        self.push(Message::welcome(welcome));
    }

    /// Re-render the greeting in `language`; earlier messages stay as they are
    pub fn switch_language(&mut self, language: Language) {
        if language == self.language {
            return;
        }
        log::debug!("Switching language {} -> {}", self.language, language);
        self.language = language;

        let welcome = self.agent.welcome.get(language).to_string();
        self.view.set_welcome_text(&welcome);

        if let Some(index) = self.messages.iter().position(Message::is_welcome) {
            self.messages[index].text = welcome;
            self.view.replace_message(index, &self.messages[index]);
        }
    }

    /// Drop the conversation and greet again
    pub fn clear(&mut self) {
        self.reset_messages();
        let welcome = self.agent.welcome.get(self.language).to_string();
        self.push(Message::welcome(welcome));
    }

    // ===== MESSAGE EXCHANGE =====

    /// Send `text` and render the reply once the backend settles
    pub async fn send_message(&mut self, text: &str) {
        let Some(pending) = self.begin_send(text) else {
            return;
        };
        let outcome = self.backend.send(pending.request()).await;
        self.complete_send(pending, outcome);
    }

    /// Send one of the suggested questions
    pub async fn send_quick_reply(&mut self, text: &str) {
        self.send_message(text).await;
    }

    /// Synchronous first half of an exchange
    ///
    /// Renders the user message, disables sending and shows the typing
    /// placeholder. Returns `None` (and changes nothing) for blank input or
    /// while another exchange is awaiting its reply.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingExchange> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self.exchange == ExchangeState::Awaiting {
            log::debug!("Send ignored: a reply is still pending");
            return None;
        }

        self.push(Message::user(text));
        self.view.clear_input();
        self.view.set_send_enabled(false);
        self.view
            .show_typing(self.config.strings.typing.get(self.language));
        self.exchange = ExchangeState::Awaiting;

        Some(PendingExchange {
            request: ChatRequest {
                message: text.to_string(),
                language: self.language,
                session_id: self.session_id.to_string(),
                agent_type: Some(self.agent.backend_type().to_string()),
            },
            conversation: self.conversation,
        })
    }

    /// Settle an exchange started by [`begin_send`](Self::begin_send)
    ///
    /// Removes the placeholder, renders exactly one bot message (reply or
    /// localized failure copy) and restores the input. A reply belonging to a
    /// conversation that was reset in the meantime is not rendered.
    pub fn complete_send(
        &mut self,
        pending: PendingExchange,
        outcome: std::result::Result<ChatReply, ExchangeError>,
    ) {
        self.view.hide_typing();

        if pending.conversation == self.conversation {
            let message = self.reply_message(outcome);
            self.push(message);
        } else {
            log::debug!("Dropping reply for a conversation that was reset");
        }

        self.exchange = ExchangeState::Idle;
        self.view.set_send_enabled(true);
        self.view.focus_input();
    }

    fn reply_message(&mut self, outcome: std::result::Result<ChatReply, ExchangeError>) -> Message {
        let strings = &self.config.strings;
        let language = self.language;

        match outcome {
            Ok(reply) => {
                if let Some(seconds) = reply.response_time {
                    log::debug!("Response time: {:.2}s", seconds);
                }
                if let Some(replies) = reply.quick_replies.as_ref().filter(|r| !r.is_empty()) {
                    self.view.set_quick_replies(replies);
                }

                if let Some(error) = reply.error.as_deref().filter(|e| !e.trim().is_empty()) {
                    log::warn!("Backend reported an error: {}", error);
                    return Message::error(error);
                }
                match reply.response_text() {
                    Some(text) => Message::bot(text),
                    None => {
                        log::warn!("Reply carried no response text");
                        Message::error(strings.fallback_reply.get(language))
                    }
                }
            }
            Err(ExchangeError::Status(status)) => {
                log::warn!("Chat request failed with HTTP {}", status);
                Message::error(strings.service_unavailable.get(language))
            }
            Err(ExchangeError::Transport(reason)) => {
                log::error!("Error sending message: {}", reason);
                Message::error(strings.connection_error.get(language))
            }
            Err(ExchangeError::Malformed(reason)) => {
                log::warn!("Unreadable chat reply: {}", reason);
                Message::error(strings.fallback_reply.get(language))
            }
        }
    }

    // ===== EXPORT =====

    /// Snapshot of the session for download; leaves the widget untouched
    pub fn export_history(&self) -> HistoryExport {
        HistoryExport::new(
            self.session_id.clone(),
            self.language,
            self.agent.id.clone(),
            self.messages.clone(),
        )
    }

    fn push(&mut self, message: Message) {
        self.view.append_message(&message);
        self.messages.push(message);
    }

    fn reset_messages(&mut self) {
        self.messages.clear();
        self.conversation += 1;
        self.view.clear_messages();
    }
}
