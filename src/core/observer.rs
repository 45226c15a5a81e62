//! Side channel for collaborators that want to follow a session without
//! driving it: the view recomputes derived state on `on_change`, and
//! transport failures (which the user only sees as an apology) are surfaced
//! in full through `on_transport_error`.

use log::{debug, warn};

use crate::core::state::SessionView;
use crate::transport::TransportError;

pub trait SessionObserver: Send + Sync {
    /// Called after every state change with freshly derived view values.
    fn on_change(&self, _view: &SessionView) {}

    /// Called with the underlying cause when an exchange fails.
    fn on_transport_error(&self, _error: &TransportError) {}
}

/// Writes session activity to the log file.
pub struct LogObserver;

impl SessionObserver for LogObserver {
    fn on_change(&self, view: &SessionView) {
        debug!(
            "Session changed: status={:?}, messages={}, draft_chars={}",
            view.status, view.message_count, view.draft_chars
        );
    }

    fn on_transport_error(&self, error: &TransportError) {
        warn!("Chat exchange failed: {}", error);
    }
}
