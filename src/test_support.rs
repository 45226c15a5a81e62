//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::core::clock::Clock;
use crate::core::message::Message;
use crate::core::observer::SessionObserver;
use crate::core::state::{DocumentRef, Session, SessionView};
use crate::transport::{AssistantReply, ChatTransport, TransportError};

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, secs: i64) {
        *self.now.lock().unwrap() += Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Replays canned outcomes in order, then replies "ok" forever.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<AssistantReply, TransportError>>>,
    calls: Mutex<Vec<(String, String, usize)>>,
    contexts: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedTransport {
    pub fn replying(text: &str) -> Self {
        let transport = Self::default();
        transport.push(Ok(AssistantReply { text: text.into() }));
        transport
    }

    pub fn failing(error: TransportError) -> Self {
        let transport = Self::default();
        transport.push(Err(error));
        transport
    }

    pub fn push(&self, outcome: Result<AssistantReply, TransportError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// `(document_id, message, context_len)` for every send, in order.
    pub fn calls(&self) -> Vec<(String, String, usize)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn contexts(&self) -> Vec<Vec<Message>> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(
        &self,
        document_id: &str,
        message: &str,
        context: &[Message],
    ) -> Result<AssistantReply, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((document_id.to_string(), message.to_string(), context.len()));
        self.contexts.lock().unwrap().push(context.to_vec());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AssistantReply { text: "ok".into() }))
    }
}

/// Records every notification it receives.
#[derive(Default)]
pub struct RecordingObserver {
    pub views: Mutex<Vec<SessionView>>,
    pub errors: Mutex<Vec<TransportError>>,
}

impl SessionObserver for RecordingObserver {
    fn on_change(&self, view: &SessionView) {
        self.views.lock().unwrap().push(*view);
    }

    fn on_transport_error(&self, error: &TransportError) {
        self.errors.lock().unwrap().push(error.clone());
    }
}

pub fn test_document() -> DocumentRef {
    DocumentRef {
        file_id: "abc".to_string(),
        file_name: "report.pdf".to_string(),
        pages: 10,
    }
}

/// Creates a session for `report.pdf` on a manual clock.
pub fn test_session() -> Session {
    test_session_with_clock().0
}

/// Like [`test_session`], but hands back the clock so tests can move time.
pub fn test_session_with_clock() -> (Session, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    (Session::new(test_document(), clock.clone()), clock)
}
