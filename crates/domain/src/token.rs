//! Access/refresh token pair with expiry tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The credentials for one authenticated session.
///
/// The pair is always stored and replaced atomically: a refresh never
/// leaves a new access token next to a stale refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived credential attached to authorized API calls.
    pub access_token: String,
    /// Longer-lived credential exchanged for a new access token.
    pub refresh_token: String,
    /// When the access token expires.
    pub expires_at: DateTime<Utc>,
    /// When this pair was obtained.
    pub obtained_at: DateTime<Utc>,
}

impl TokenPair {
    /// Creates a pair from a token grant, computing the absolute expiry.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in_secs: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: now + chrono::Duration::seconds(expires_in_secs.cast_signed()),
            obtained_at: now,
        }
    }

    /// Check if the access token is expired, or will be within the skew.
    ///
    /// The skew absorbs clock drift between client and backend and the
    /// latency of the request that will carry the token.
    #[must_use]
    pub fn is_expired_or_expiring(&self, skew_seconds: i64, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::seconds(skew_seconds) >= self.expires_at
    }

    /// Seconds until the access token expires (negative if already past).
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_absolute_expiry_computed_from_grant() {
        let pair = TokenPair::new("access", "refresh", 900, at(0));
        assert_eq!(pair.expires_at, at(900));
        assert_eq!(pair.obtained_at, at(0));
        assert_eq!(pair.seconds_until_expiry(at(0)), 900);
    }

    #[test]
    fn test_expiry_with_skew() {
        let pair = TokenPair::new("access", "refresh", 900, at(0));

        assert!(!pair.is_expired_or_expiring(0, at(0)));
        assert!(!pair.is_expired_or_expiring(30, at(860)));
        // 870 + 30s skew reaches the 900s expiry
        assert!(pair.is_expired_or_expiring(30, at(870)));
        assert!(pair.is_expired_or_expiring(0, at(900)));
        assert!(pair.is_expired_or_expiring(0, at(1000)));
    }

    #[test]
    fn test_authorization_header() {
        let pair = TokenPair::new("abc123", "refresh", 900, at(0));
        assert_eq!(pair.authorization_header(), "Bearer abc123");
    }

    #[test]
    fn test_serde_round_trip() {
        let pair = TokenPair::new("access", "refresh", 900, at(0));
        let json = serde_json::to_string(&pair).unwrap();
        let back: TokenPair = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pair);
    }
}
