//! Observable session state.
//!
//! A watch channel wrapping the [`Session`] record. UI collaborators
//! subscribe for push updates or take snapshots; mutation is crate
//! private and validated against the state machine, so no collaborator
//! can reach `Authenticated` around the lifecycle manager.

use std::sync::Arc;

use tokio::sync::watch;

use aegis_domain::{Session, SessionState, User};

/// Cloneable handle to the current session state.
#[derive(Debug, Clone)]
pub struct SharedSession {
    tx: Arc<watch::Sender<Session>>,
}

impl SharedSession {
    /// Creates a handle in the `Uninitialized` state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Session::default());
        Self { tx: Arc::new(tx) }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.tx.borrow().state
    }

    /// True while a verified session is in place.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Applies a transition if the state machine allows it. Returns
    /// whether the session changed.
    fn transition(&self, next: SessionState, user: Option<User>, error: Option<String>) -> bool {
        self.tx.send_if_modified(|session| {
            if !session.state.may_transition(next) {
                return false;
            }
            *session = Session {
                state: next,
                user,
                last_error: error,
            };
            true
        })
    }

    /// Enters `Initializing`. Only legal from `Uninitialized`.
    pub(crate) fn begin_initializing(&self) -> bool {
        self.transition(SessionState::Initializing, None, None)
    }

    /// Enters `Authenticated` with the verified user.
    pub(crate) fn authenticated(&self, user: User) {
        self.transition(SessionState::Authenticated, Some(user), None);
    }

    /// Enters `Unauthenticated`, keeping the failure for display.
    pub(crate) fn unauthenticated(&self, error: Option<String>) {
        self.transition(SessionState::Unauthenticated, None, error);
    }
}

impl Default for SharedSession {
    fn default() -> Self {
        Self::new()
    }
}
