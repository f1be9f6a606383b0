//! Token persistence with expiry tracking.
//!
//! The store is the single holder of the session's token pair. All
//! writes funnel through `login()` and the refresh coordinator; nothing
//! else in the system mutates tokens.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use aegis_domain::TokenPair;
use tokio::sync::Mutex;

use crate::ports::{Clock, KeyValueStore};

/// Storage key for the serialized token pair. The pair is stored as one
/// JSON value so a refresh replaces both tokens atomically.
const TOKENS_KEY: &str = "aegis.tokens";

/// Default seconds of slack when deciding expiry.
const DEFAULT_SKEW_SECS: i64 = 30;

/// Durable holder for the current token pair.
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    skew_secs: i64,
    /// Bumped on every mutation. In-flight work records the epoch before
    /// suspending and discards its result if the epoch moved, so a
    /// response arriving after logout cannot resurrect the session.
    epoch: AtomicU64,
    /// Serializes the epoch check, the bump, and the storage operation.
    /// Without it a refresh settling concurrently with `clear_tokens`
    /// could pass the epoch check yet write after the remove.
    write_lock: Mutex<()>,
}

impl TokenStore {
    /// Creates a store with the default expiry skew.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_skew(store, clock, DEFAULT_SKEW_SECS)
    }

    /// Creates a store with a custom expiry skew.
    #[must_use]
    pub fn with_skew(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, skew_secs: i64) -> Self {
        Self {
            store,
            clock,
            skew_secs,
            epoch: AtomicU64::new(0),
            write_lock: Mutex::new(()),
        }
    }

    /// Stores a token pair, computing the absolute expiry. Idempotent
    /// overwrite.
    pub async fn set_tokens(&self, access_token: &str, refresh_token: &str, expires_in_secs: u64) {
        let _guard = self.write_lock.lock().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.write(access_token, refresh_token, expires_in_secs).await;
    }

    /// Stores a token pair only if no other mutation landed since
    /// `observed_epoch` was read. Returns whether the write happened.
    /// The check and the write share the store's write lock, so a
    /// concurrent `clear_tokens` either runs before the check (and the
    /// write is refused) or after it (and clears these tokens again).
    pub async fn set_tokens_if_unchanged(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_in_secs: u64,
        observed_epoch: u64,
    ) -> bool {
        let _guard = self.write_lock.lock().await;
        if self.epoch.load(Ordering::SeqCst) != observed_epoch {
            return false;
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.write(access_token, refresh_token, expires_in_secs).await;
        true
    }

    async fn write(&self, access_token: &str, refresh_token: &str, expires_in_secs: u64) {
        let pair = TokenPair::new(access_token, refresh_token, expires_in_secs, self.clock.now());
        if let Ok(json) = serde_json::to_string(&pair) {
            self.store.set(TOKENS_KEY, &json).await;
        }
    }

    /// Returns the stored pair, if any.
    pub async fn tokens(&self) -> Option<TokenPair> {
        let json = self.store.get(TOKENS_KEY).await?;
        serde_json::from_str(&json).ok()
    }

    /// Returns the current access token.
    pub async fn access_token(&self) -> Option<String> {
        self.tokens().await.map(|pair| pair.access_token)
    }

    /// Returns the current refresh token.
    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens().await.map(|pair| pair.refresh_token)
    }

    /// Whether the access token is expired or expiring within the skew.
    /// A missing token counts as expired.
    pub async fn is_access_token_expired(&self) -> bool {
        self.tokens().await.is_none_or(|pair| {
            pair.is_expired_or_expiring(self.skew_secs, self.clock.now())
        })
    }

    /// Whether a recoverable session is present: both tokens stored,
    /// refresh token assumed usable even when the access token lapsed.
    pub async fn has_valid_tokens(&self) -> bool {
        self.tokens().await.is_some()
    }

    /// Removes all token state.
    pub async fn clear_tokens(&self) {
        let _guard = self.write_lock.lock().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.store.remove(TOKENS_KEY).await;
    }

    /// Removes all token state only if no other mutation landed since
    /// `observed_epoch` was read. Returns whether the remove happened.
    pub async fn clear_tokens_if_unchanged(&self, observed_epoch: u64) -> bool {
        let _guard = self.write_lock.lock().await;
        if self.epoch.load(Ordering::SeqCst) != observed_epoch {
            return false;
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.store.remove(TOKENS_KEY).await;
        true
    }

    /// Current mutation epoch, for the stale-response guard.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}
