//! Line-oriented view for hosting the widget in a terminal.

use super::message::{Message, MessageKind, Sender};
use super::view::WidgetView;
use crate::config::WidgetConfig;
use std::fmt;
use std::io::Write;

/// Renders the widget as plain text lines on any writer
pub struct TerminalView<W: Write> {
    out: W,
    agent_label: String,
    quick_replies: Vec<String>,
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            agent_label: String::new(),
            quick_replies: Vec::new(),
        }
    }

    /// Quick replies currently on display
    pub fn quick_replies(&self) -> &[String] {
        &self.quick_replies
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            log::warn!("Failed to write to terminal: {}", e);
        }
    }

    fn format_message(&self, message: &Message) -> String {
        let time = message
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M");
        let who = match message.sender {
            Sender::User => "Вы",
            Sender::Bot => self.agent_label.as_str(),
        };
        let marker = if message.kind == MessageKind::Error {
            "(!) "
        } else {
            ""
        };
        format!("[{}] {}: {}{}", time, who, marker, message.text)
    }
}

impl<W: Write> WidgetView for TerminalView<W> {
    fn mount(&mut self, config: &WidgetConfig) {
        self.emit(format_args!("=== {} ===", config.title));
    }

    fn set_open(&mut self, open: bool) {
        if open {
            self.emit(format_args!("[chat opened]"));
        } else {
            self.emit(format_args!("[chat minimized, type /open to expand]"));
        }
    }

    fn focus_input(&mut self) {}

    fn clear_input(&mut self) {}

    fn set_send_enabled(&mut self, _enabled: bool) {}

    fn show_typing(&mut self, text: &str) {
        self.emit(format_args!("  ... {}", text));
    }

    fn hide_typing(&mut self) {}

    fn append_message(&mut self, message: &Message) {
        let line = self.format_message(message);
        self.emit(format_args!("{}", line));
    }

    fn replace_message(&mut self, _index: usize, message: &Message) {
        let line = self.format_message(message);
        self.emit(format_args!("{} (updated)", line));
    }

    fn clear_messages(&mut self) {
        self.emit(format_args!("--- conversation cleared ---"));
    }

    fn set_agent_label(&mut self, label: &str) {
        self.agent_label = label.to_string();
        self.emit(format_args!("Agent: {}", label));
    }

    fn set_welcome_text(&mut self, _text: &str) {}

    fn set_quick_replies(&mut self, replies: &[String]) {
        self.quick_replies = replies.to_vec();
        if replies.is_empty() {
            return;
        }
        let listed: Vec<String> = replies
            .iter()
            .enumerate()
            .map(|(i, reply)| format!("[{}] {}", i + 1, reply))
            .collect();
        self.emit(format_args!("Quick replies: {}", listed.join("  ")));
    }
}
