use std::fmt;

use async_trait::async_trait;

use crate::core::message::Message;

/// Number of prior messages sent with each request for conversational grounding.
pub const CONTEXT_WINDOW: usize = 5;

/// Errors from a single chat exchange. The user only ever sees a fixed
/// apology; these are for logs and diagnostics observers.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Transport misconfigured (bad URL, client could not be built).
    Config(String),
    /// Connection refused, DNS failure, timeout, body read failure.
    Network(String),
    /// Backend answered with a non-2xx status.
    Api { status: u16, message: String },
    /// Body was not the expected `{ "response": string }` shape.
    Parse(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Config(msg) => write!(f, "config error: {msg}"),
            TransportError::Network(msg) => write!(f, "network error: {msg}"),
            TransportError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            TransportError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// The backend's complete answer to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub text: String,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Returns the name of the transport, for logging.
    fn name(&self) -> &str;

    /// Sends `message` about `document_id` along with the prior `context`
    /// and waits for the full reply. Resolves exactly once; every failure
    /// comes back as `Err`, never as a panic. No retries happen here.
    async fn send(
        &self,
        document_id: &str,
        message: &str,
        context: &[Message],
    ) -> Result<AssistantReply, TransportError>;
}
