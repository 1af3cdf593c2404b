pub mod controller;
pub mod message;
pub mod terminal;
pub mod view;

pub use controller::{ExchangeState, PendingExchange, WidgetController};
pub use message::{Message, MessageKind, Sender, SessionId};
pub use terminal::TerminalView;
pub use view::{RecordingView, ViewEvent, WidgetView};
