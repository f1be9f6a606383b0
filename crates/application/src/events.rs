//! Session events for observers.
//!
//! A broadcast channel carrying lifecycle notifications, so UI
//! collaborators can react (toast on forced logout, refresh indicators)
//! without polling. Sending never blocks and dropping receivers is
//! harmless.

use tokio::sync::broadcast;

use aegis_domain::AuthError;

/// Capacity of the broadcast channel. Laggy receivers lose the oldest
/// events, which is acceptable for UI notifications.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Events emitted by the session core.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A login completed and the session is authenticated.
    LoggedIn {
        /// Email the session was established for.
        email: String,
    },
    /// The session ended, user-initiated or forced.
    LoggedOut,
    /// A refresh stored a new token pair.
    TokenRefreshed {
        /// Seconds until the new access token expires.
        expires_in: u64,
    },
    /// A refresh attempt failed.
    RefreshFailed {
        /// What went wrong.
        error: AuthError,
    },
    /// The backend invalidated the session; tokens were cleared.
    SessionInvalidated,
    /// The background renewal loop exhausted its retry budget.
    RenewalExhausted {
        /// Consecutive failed attempts.
        attempts: u32,
    },
}

/// Shared handle to the event channel.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    /// Creates the channel.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribes a new receiver.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emits an event. A send with no receivers is not an error.
    pub(crate) fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
