//! Remember-me persistence.
//!
//! Lives in the same key-value store as the tokens but on its own key
//! and its own lifetime: it survives logout while enabled and expires on
//! a horizon of days.

use std::sync::Arc;

use crate::ports::{Clock, KeyValueStore};
use aegis_domain::RememberMePreference;

/// Storage key for the serialized preference.
const REMEMBER_KEY: &str = "aegis.remember_me";

/// Store for the opt-in remembered login email.
pub struct RememberMeStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    horizon_days: i64,
}

impl RememberMeStore {
    /// Creates a store with the given expiry horizon.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, horizon_days: i64) -> Self {
        Self {
            store,
            clock,
            horizon_days,
        }
    }

    /// Persists the preference. Disabling drops any remembered email.
    pub async fn set_remember_me(&self, enabled: bool, email: &str) {
        let preference = if enabled {
            RememberMePreference::remembering(email, self.clock.now())
        } else {
            RememberMePreference::disabled(self.clock.now())
        };
        if let Ok(json) = serde_json::to_string(&preference) {
            self.store.set(REMEMBER_KEY, &json).await;
        }
    }

    /// The remembered email, if enabled and within the horizon.
    pub async fn remembered_email(&self) -> Option<String> {
        let preference = self.load().await?;
        if !preference.enabled || preference.is_expired(self.horizon_days, self.clock.now()) {
            return None;
        }
        preference.email
    }

    /// Whether remember-me is currently enabled and unexpired.
    pub async fn is_enabled(&self) -> bool {
        match self.load().await {
            Some(preference) => {
                preference.enabled && !preference.is_expired(self.horizon_days, self.clock.now())
            }
            None => false,
        }
    }

    /// Removes the preference entirely.
    pub async fn clear(&self) {
        self.store.remove(REMEMBER_KEY).await;
    }

    async fn load(&self) -> Option<RememberMePreference> {
        let json = self.store.get(REMEMBER_KEY).await?;
        serde_json::from_str(&json).ok()
    }
}
