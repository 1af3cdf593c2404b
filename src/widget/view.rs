//! Render seam between the controller and whatever draws the widget.
//!
//! The controller never looks anything up by id: every visual side effect
//! goes through [`WidgetView`], which the host injects at construction.

use super::message::Message;
use crate::config::WidgetConfig;

/// Visual side effects the controller can request
pub trait WidgetView {
    /// Build the widget chrome (title, position, theme)
    fn mount(&mut self, config: &WidgetConfig);

    /// Show the panel and hide the toggle button, or the reverse
    fn set_open(&mut self, open: bool);

    fn focus_input(&mut self);

    fn clear_input(&mut self);

    fn set_send_enabled(&mut self, enabled: bool);

    /// Show the transient "typing" placeholder
    fn show_typing(&mut self, text: &str);

    fn hide_typing(&mut self);

    fn append_message(&mut self, message: &Message);

    /// Re-render the message at `index` in place
    fn replace_message(&mut self, index: usize, message: &Message);

    fn clear_messages(&mut self);

    fn set_agent_label(&mut self, label: &str);

    fn set_welcome_text(&mut self, text: &str);

    fn set_quick_replies(&mut self, replies: &[String]);
}

/// One recorded view call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Mounted,
    Open(bool),
    FocusInput,
    ClearInput,
    SendEnabled(bool),
    TypingShown(String),
    TypingHidden,
    Appended(Message),
    Replaced(usize, Message),
    Cleared,
    AgentLabel(String),
    WelcomeText(String),
    QuickReplies(Vec<String>),
}

/// Headless view that keeps the rendered state and a log of every call
///
/// Lets the controller run under a test harness without a real page.
#[derive(Debug, Default, Clone)]
pub struct RecordingView {
    events: Vec<ViewEvent>,
    pub open: bool,
    pub send_enabled: bool,
    pub typing_visible: bool,
    pub messages: Vec<Message>,
    pub agent_label: String,
    pub welcome_text: String,
    pub quick_replies: Vec<String>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ViewEvent] {
        &self.events
    }

    /// Forget recorded calls, keep rendered state
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn count(&self, predicate: impl Fn(&ViewEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl WidgetView for RecordingView {
    fn mount(&mut self, _config: &WidgetConfig) {
        self.events.push(ViewEvent::Mounted);
    }

    fn set_open(&mut self, open: bool) {
        self.open = open;
        self.events.push(ViewEvent::Open(open));
    }

    fn focus_input(&mut self) {
        self.events.push(ViewEvent::FocusInput);
    }

    fn clear_input(&mut self) {
        self.events.push(ViewEvent::ClearInput);
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
        self.events.push(ViewEvent::SendEnabled(enabled));
    }

    fn show_typing(&mut self, text: &str) {
        self.typing_visible = true;
        self.events.push(ViewEvent::TypingShown(text.to_string()));
    }

    fn hide_typing(&mut self) {
        self.typing_visible = false;
        self.events.push(ViewEvent::TypingHidden);
    }

    fn append_message(&mut self, message: &Message) {
        self.messages.push(message.clone());
        self.events.push(ViewEvent::Appended(message.clone()));
    }

    fn replace_message(&mut self, index: usize, message: &Message) {
        if let Some(slot) = self.messages.get_mut(index) {
            *slot = message.clone();
        }
        self.events.push(ViewEvent::Replaced(index, message.clone()));
    }

    fn clear_messages(&mut self) {
        self.messages.clear();
        self.events.push(ViewEvent::Cleared);
    }

    fn set_agent_label(&mut self, label: &str) {
        self.agent_label = label.to_string();
        self.events.push(ViewEvent::AgentLabel(label.to_string()));
    }

    fn set_welcome_text(&mut self, text: &str) {
        self.welcome_text = text.to_string();
        self.events.push(ViewEvent::WelcomeText(text.to_string()));
    }

    fn set_quick_replies(&mut self, replies: &[String]) {
        self.quick_replies = replies.to_vec();
        self.events.push(ViewEvent::QuickReplies(replies.to_vec()));
    }
}
