pub mod chat;
pub mod client;
pub mod config;
pub mod constants;
pub mod format;
pub mod message;
pub mod terminal_view;
pub mod transport;
pub mod view;
pub mod web_server;

pub use client::{ChatClient, ClientState, IgnoreReason, Submission};
pub use config::ChatConfig;
pub use message::{Kind, Message, Role};
pub use transport::{HttpTransport, ReplyPayload, Transport, TransportError};
pub use view::{ChatView, HtmlView};
