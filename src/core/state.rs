//! # Session State
//!
//! Everything one document conversation owns. No TUI types here;
//! presentation state lives in the `tui` module.
//!
//! ```text
//! Session
//! ├── document: DocumentRef            // fixed for the session's lifetime
//! ├── store: MessageStore              // append-only chat log
//! ├── input: InputController           // staged draft
//! ├── in_flight: Option<ExchangeId>    // Some(..) <=> awaiting-response
//! ├── ids: IdGenerator                 // message ids
//! ├── clock: Arc<dyn Clock>            // timestamps
//! └── observers: Vec<Arc<dyn SessionObserver>>
//! ```
//!
//! State changes only happen through `update(session, action)` in action.rs.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::clock::Clock;
use crate::core::exchange::ExchangeId;
use crate::core::input::{InputController, MAX_INPUT_CHARS};
use crate::core::message::{IdGenerator, Message, MessageId, MessageStore};
use crate::core::observer::SessionObserver;
use crate::transport::TransportError;

/// Shown in place of the assistant reply when an exchange fails.
pub const ERROR_APOLOGY: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

/// Starter questions offered until the first exchange begins.
pub const SUGGESTED_PROMPTS: [&str; 4] = [
    "What is the main topic of this document?",
    "Can you summarize the key points?",
    "What are the main conclusions or recommendations?",
    "Are there any important statistics or data points?",
];

pub fn welcome_text(file_name: &str) -> String {
    format!(
        "Hello! I'm ready to help you analyze \"{file_name}\". You can ask me questions about \
         the document's content, request summaries, or explore specific topics. \
         What would you like to know?"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    AwaitingResponse,
}

/// The uploaded document a session is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub file_id: String,
    pub file_name: String,
    pub pages: u32,
}

/// Read-only values the view derives from a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionView {
    pub status: Status,
    pub message_count: usize,
    pub show_suggested_prompts: bool,
    pub draft_chars: usize,
    pub over_limit: bool,
    pub can_submit: bool,
}

pub struct Session {
    document: DocumentRef,
    pub(crate) store: MessageStore,
    pub(crate) input: InputController,
    pub(crate) in_flight: Option<ExchangeId>,
    next_exchange: u64,
    ids: IdGenerator,
    clock: Arc<dyn Clock>,
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl Session {
    /// Starts a conversation about `document`, seeded with the welcome message.
    pub fn new(document: DocumentRef, clock: Arc<dyn Clock>) -> Self {
        let mut session = Self {
            document,
            store: MessageStore::new(),
            input: InputController::new(),
            in_flight: None,
            next_exchange: 1,
            ids: IdGenerator::new(),
            clock,
            observers: Vec::new(),
        };
        let welcome = welcome_text(&session.document.file_name);
        session.append_new(Message::assistant, welcome);
        session
    }

    pub fn subscribe(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn document(&self) -> &DocumentRef {
        &self.document
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn draft(&self) -> &str {
        self.input.draft()
    }

    pub fn status(&self) -> Status {
        if self.in_flight.is_some() {
            Status::AwaitingResponse
        } else {
            Status::Idle
        }
    }

    pub fn in_flight(&self) -> Option<ExchangeId> {
        self.in_flight
    }

    pub fn show_suggested_prompts(&self) -> bool {
        self.store.len() <= 1
    }

    pub fn view(&self) -> SessionView {
        let draft_chars = self.input.char_count();
        SessionView {
            status: self.status(),
            message_count: self.store.len(),
            show_suggested_prompts: self.show_suggested_prompts(),
            draft_chars,
            over_limit: draft_chars > MAX_INPUT_CHARS,
            can_submit: InputController::is_submittable(self.input.draft(), self.status()),
        }
    }

    /// Builds a message with a fresh id and the current time and appends it.
    ///
    /// # Panics
    /// If the store already holds the generated id. Ids come from a private
    /// counter, so this means the session itself is corrupt.
    pub(crate) fn append_new(
        &mut self,
        build: fn(MessageId, String, DateTime<Utc>) -> Message,
        content: String,
    ) -> MessageId {
        let id = self.ids.next_id();
        let message = build(id, content, self.clock.now());
        if let Err(e) = self.store.append(message) {
            panic!("message store invariant violated: {e}");
        }
        id
    }

    pub(crate) fn begin_exchange(&mut self) -> ExchangeId {
        let id = ExchangeId(self.next_exchange);
        self.next_exchange += 1;
        self.in_flight = Some(id);
        id
    }

    pub(crate) fn notify_change(&self) {
        let view = self.view();
        for observer in &self.observers {
            observer.on_change(&view);
        }
    }

    pub(crate) fn report_failure(&self, error: &TransportError) {
        for observer in &self.observers {
            observer.on_transport_error(error);
        }
    }
}
