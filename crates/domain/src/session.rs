//! Session state machine and user identity.
//!
//! The state machine is deliberately small:
//!
//! ```text
//! Uninitialized -> Initializing -> { Authenticated, Unauthenticated }
//! Authenticated <-> Unauthenticated
//! ```
//!
//! There is no path back to `Initializing` once startup validation has
//! completed, and nothing outside the lifecycle manager may reach
//! `Authenticated` without a verified token pair.

use serde::{Deserialize, Serialize};

/// Identity record returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend-assigned identifier.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Display name, if the backend provides one.
    #[serde(default)]
    pub name: Option<String>,
}

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Startup validation has not run yet.
    #[default]
    Uninitialized,
    /// Startup validation is in progress.
    Initializing,
    /// A verified, non-expired token pair is in place.
    Authenticated,
    /// No usable session.
    Unauthenticated,
}

impl SessionState {
    /// Whether the state machine permits moving to `next`.
    ///
    /// Re-entering the current terminal state is allowed (re-login,
    /// repeated logout); re-entering `Initializing` or `Uninitialized`
    /// is not.
    #[must_use]
    pub const fn may_transition(self, next: Self) -> bool {
        match next {
            Self::Uninitialized => false,
            Self::Initializing => matches!(self, Self::Uninitialized),
            Self::Authenticated | Self::Unauthenticated => true,
        }
    }
}

/// The overall authentication state exposed to collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Session {
    /// Current lifecycle state.
    pub state: SessionState,
    /// The authenticated user, while `state` is `Authenticated`.
    pub user: Option<User>,
    /// Message from the most recent failure, for display.
    pub last_error: Option<String>,
}

impl Session {
    /// Returns true while a verified session is in place.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated)
    }

    /// Returns true while startup validation is still running.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(
            self.state,
            SessionState::Uninitialized | SessionState::Initializing
        )
    }
}
