//! # Message Store
//!
//! The ordered log of chat turns for one session.
//!
//! ```text
//! MessageStore
//! ├── messages: Vec<Message>     // insertion order = display order
//! └── ids: HashSet<MessageId>    // duplicate detection
//! ```
//!
//! History is append-only. There is no way to remove or edit a message once
//! it is in the store, so anything holding a `&Message` sees a stable value.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};

/// Identity of a message within a session. Strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out message ids from a counter, so two messages created within the
/// same clock tick still get distinct ids.
#[derive(Debug)]
pub struct IdGenerator {
    next: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> MessageId {
        let id = MessageId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One turn in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    /// Plain text for user turns, markdown for assistant turns.
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Set only on assistant turns synthesized after a transport failure.
    pub is_error: bool,
}

impl Message {
    pub fn user(id: MessageId, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::User,
            content,
            timestamp,
            is_error: false,
        }
    }

    pub fn assistant(id: MessageId, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content,
            timestamp,
            is_error: false,
        }
    }

    pub fn error(id: MessageId, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            is_error: true,
            ..Self::assistant(id, content, timestamp)
        }
    }
}

/// Raised when a message is appended with an id the store already holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateIdError(pub MessageId);

impl fmt::Display for DuplicateIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message id {} is already in the store", self.0)
    }
}

impl std::error::Error for DuplicateIdError {}

#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    ids: HashSet<MessageId>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `message` to the end of the log.
    pub fn append(&mut self, message: Message) -> Result<(), DuplicateIdError> {
        if !self.ids.insert(message.id) {
            return Err(DuplicateIdError(message.id));
        }
        self.messages.push(message);
        Ok(())
    }

    /// The most recent `n` messages, oldest first. Asking for more than the
    /// store holds returns everything.
    pub fn last_n(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// The most recent `n` messages that are real conversation turns, oldest
    /// first. Locally synthesized error replies are skipped.
    pub fn context_window(&self, n: usize) -> Vec<Message> {
        let mut window: Vec<Message> = self
            .messages
            .iter()
            .rev()
            .filter(|m| !m.is_error)
            .take(n)
            .cloned()
            .collect();
        window.reverse();
        window
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
