//! Remember-me preference.
//!
//! An opt-in, long-lived identifier that is independent of the token
//! pair: it survives logout while enabled, and expires on a horizon of
//! days rather than the minutes of an access token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted remember-me preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberMePreference {
    /// Whether the user opted in.
    pub enabled: bool,
    /// Remembered login email, while enabled.
    pub email: Option<String>,
    /// When the preference was written.
    pub saved_at: DateTime<Utc>,
}

impl RememberMePreference {
    /// Creates an enabled preference remembering `email`.
    #[must_use]
    pub fn remembering(email: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            enabled: true,
            email: Some(email.into()),
            saved_at: now,
        }
    }

    /// Creates a disabled preference.
    #[must_use]
    pub const fn disabled(now: DateTime<Utc>) -> Self {
        Self {
            enabled: false,
            email: None,
            saved_at: now,
        }
    }

    /// Whether the preference has outlived its horizon.
    #[must_use]
    pub fn is_expired(&self, horizon_days: i64, now: DateTime<Utc>) -> bool {
        now - self.saved_at >= chrono::Duration::days(horizon_days)
    }
}
