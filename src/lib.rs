pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod widget;

//  Re-export commonly used items
pub use api::{
    AgentDescriptor, AgentListing, ChatBackend, ChatReply, ChatRequest, ExchangeError,
    HealthStatus, HttpBackend,
};
pub use config::{
    Agent, AgentRegistry, Language, LocalizedText, Position, Theme, UiStrings, WidgetConfig,
};
pub use error::WidgetError;
pub use export::HistoryExport;
pub use widget::{
    ExchangeState, Message, MessageKind, PendingExchange, RecordingView, Sender, SessionId,
    TerminalView, ViewEvent, WidgetController, WidgetView,
};
