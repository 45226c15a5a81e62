pub mod client;
pub mod http;
pub mod types;

pub use client::{AssistantReply, CONTEXT_WINDOW, ChatTransport, TransportError};
pub use http::HttpChatTransport;
pub use types::{ChatRequest, ChatResponse, HistoryEntry};
