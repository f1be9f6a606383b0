//! Authentication error taxonomy
//!
//! Errors are clonable so the refresh coordinator can fan a single
//! outcome out to every waiter that joined the in-flight attempt.

use thiserror::Error;

/// Errors produced by the session token lifecycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Transient transport failure. Recoverable by retry; never clears
    /// token state on its own.
    #[error("network error: {message}")]
    Network {
        /// Error description.
        message: String,
    },

    /// The backend rejected the login credentials.
    #[error("invalid credentials: {message}")]
    InvalidCredentials {
        /// Error description from the backend.
        message: String,
    },

    /// A request still received 401 after its one post-refresh retry.
    #[error("request unauthorized after token refresh")]
    Unauthorized,

    /// The backend rejected the refresh token. Fatal: clears tokens and
    /// forces the session to `Unauthenticated`.
    #[error("token refresh failed: {message}")]
    RefreshFailed {
        /// Error description.
        message: String,
    },

    /// The background renewal loop exhausted its retry budget.
    #[error("token renewal gave up after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Number of consecutive failed attempts.
        attempts: u32,
    },

    /// A result arrived after the session it belonged to was torn down
    /// or replaced, and was discarded.
    #[error("stale result: session changed while the call was in flight")]
    Stale,

    /// The persistence layer misbehaved.
    #[error("storage error: {message}")]
    Storage {
        /// Error description.
        message: String,
    },
}

impl AuthError {
    /// Creates a `Network` error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a `RefreshFailed` error.
    pub fn refresh_failed(message: impl Into<String>) -> Self {
        Self::RefreshFailed {
            message: message.into(),
        }
    }

    /// Creates an `InvalidCredentials` error.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            message: message.into(),
        }
    }

    /// Returns true for failures that may succeed if simply retried.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Returns true for failures that invalidate the session.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::RefreshFailed { .. } | Self::MaxRetriesExceeded { .. })
    }
}

/// Result type alias for session lifecycle operations.
pub type AuthResult<T> = Result<T, AuthError>;
