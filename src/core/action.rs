//! # Actions
//!
//! Everything that can happen to a session becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! Backend answers? That's `Action::ResponseReceived { .. }`.
//!
//! `update()` applies an action to the session and returns an `Effect`
//! describing any I/O the caller must perform. No I/O happens here.
//!
//! ```text
//! Session + Action  →  update()  →  Effect
//!
//!            Submit (valid)
//!   Idle ─────────────────────────▶ AwaitingResponse
//!    ▲                                   │
//!    └─── ResponseReceived / Failed ─────┘
//! ```
//!
//! Terminal events are matched against the in-flight `ExchangeId`; anything
//! stale or unexpected is dropped without touching the session.

use log::{debug, info, warn};

use crate::core::exchange::{Exchange, ExchangeId};
use crate::core::input::{InputController, ValidationError};
use crate::core::message::Message;
use crate::core::state::{ERROR_APOLOGY, SUGGESTED_PROMPTS, Session};
use crate::transport::{AssistantReply, CONTEXT_WINDOW, TransportError};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replace the staged draft.
    EditDraft(String),
    /// Stage one of `SUGGESTED_PROMPTS` as the draft.
    PickSuggestion(usize),
    /// Submit the staged draft.
    Submit,
    ResponseReceived {
        exchange: ExchangeId,
        reply: AssistantReply,
    },
    ResponseFailed {
        exchange: ExchangeId,
        error: TransportError,
    },
    /// Leave this document and go back to upload.
    Back,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Run this exchange and feed its result back through `update()`.
    SpawnRequest(Exchange),
    /// The submission was refused; nothing changed.
    Rejected(ValidationError),
    /// Discard this session and return to upload.
    Back,
    Quit,
}

pub fn update(session: &mut Session, action: Action) -> Effect {
    match action {
        Action::EditDraft(text) => {
            session.input.set_draft(text);
            session.notify_change();
            Effect::None
        }
        Action::PickSuggestion(index) => {
            if !session.show_suggested_prompts() {
                return Effect::None;
            }
            if let Some(prompt) = SUGGESTED_PROMPTS.get(index) {
                session.input.set_draft((*prompt).to_string());
                session.notify_change();
            }
            Effect::None
        }
        Action::Submit => submit(session),
        Action::ResponseReceived { exchange, reply } => {
            if !settle(session, exchange) {
                return Effect::None;
            }
            session.append_new(Message::assistant, reply.text);
            session.notify_change();
            Effect::None
        }
        Action::ResponseFailed { exchange, error } => {
            if !settle(session, exchange) {
                return Effect::None;
            }
            session.report_failure(&error);
            session.append_new(Message::error, ERROR_APOLOGY.to_string());
            session.notify_change();
            Effect::None
        }
        Action::Back => Effect::Back,
        Action::Quit => Effect::Quit,
    }
}

fn submit(session: &mut Session) -> Effect {
    if let Err(reason) = InputController::validate(session.input.draft(), session.status()) {
        debug!("Submission rejected: {}", reason);
        return Effect::Rejected(reason);
    }

    let message = session.input.draft().to_string();
    // Captured before the new turn is appended; the message travels separately.
    let context = session.store.context_window(CONTEXT_WINDOW);

    session.append_new(Message::user, message.clone());
    session.input.clear();
    let id = session.begin_exchange();
    session.notify_change();

    info!(
        "Exchange {} started ({} chars, {} context messages)",
        id.0,
        message.chars().count(),
        context.len()
    );

    Effect::SpawnRequest(Exchange {
        id,
        document_id: session.document().file_id.clone(),
        message,
        context,
    })
}

/// Clears the in-flight exchange if `exchange` is it.
fn settle(session: &mut Session, exchange: ExchangeId) -> bool {
    match session.in_flight {
        Some(current) if current == exchange => {
            session.in_flight = None;
            info!("Exchange {} settled", exchange.0);
            true
        }
        current => {
            warn!(
                "Ignoring result for exchange {} (in flight: {:?})",
                exchange.0, current
            );
            false
        }
    }
}
