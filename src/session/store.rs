//! Publishing wrapper around the single `SessionState`.
//!
//! Snapshots go out on a `watch` channel, surfaced errors on a `broadcast`
//! channel. Transitions run synchronously inside `send_if_modified`, so no
//! state change ever straddles a suspension point.

use tokio::sync::{broadcast, watch};

use crate::blockchain::types::RawFailure;
use crate::observability::metrics;
use crate::session::error::ErrorReport;
use crate::session::state::{Field, RefreshTicket, SessionState};
use crate::session::ErrorKind;

const ERROR_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug)]
pub struct SessionStore {
    state: watch::Sender<SessionState>,
    errors: broadcast::Sender<ErrorReport>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::new());
        let (errors, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);
        Self { state, errors }
    }

    /// Copy of the current state.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn subscribe_errors(&self) -> broadcast::Receiver<ErrorReport> {
        self.errors.subscribe()
    }

    /// Run a transition. Subscribers are notified when it returns true.
    pub fn update(&self, transition: impl FnOnce(&mut SessionState) -> bool) -> bool {
        self.state.send_if_modified(transition)
    }

    pub fn begin_refresh(&self, field: Field) -> RefreshTicket {
        let mut ticket = RefreshTicket::unissued(field);
        // Tickets are bookkeeping only; do not wake subscribers.
        self.state.send_if_modified(|state| {
            ticket = state.begin_refresh(field);
            false
        });
        ticket
    }

    /// Classify a boundary failure, record it and publish it.
    pub fn report(&self, operation: &'static str, failure: &RawFailure) -> ErrorKind {
        let report = ErrorReport::from_failure(failure);
        let kind = report.kind;

        if kind == ErrorKind::Unknown {
            tracing::error!(operation, error = %failure, "Unrecognised failure");
        } else {
            tracing::warn!(operation, kind = kind.as_str(), error = %failure, "Operation failed");
        }
        metrics::record_error(kind);

        self.update(|state| {
            state.apply_error(kind);
            true
        });
        // No subscribers is fine; the kind is still in `last_error`.
        let _ = self.errors.send(report);
        kind
    }

    pub fn clear_error(&self) {
        self.update(|state| {
            let had_error = state.last_error().is_some();
            state.clear_error();
            had_error
        });
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
