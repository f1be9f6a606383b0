//! Shared doubles for the crate's unit tests: a manual clock, an
//! in-memory store, a scriptable [`AuthApi`] mock with a latch for
//! exercising in-flight races, and a bearer-checking transport.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::watch;

use aegis_domain::{ApiRequest, ApiResponse, AuthError, AuthResult, User};

use crate::ports::{ApiTransport, AuthApi, Clock, KeyValueStore, LoginResponse, TokenGrant};

pub fn test_user() -> User {
    User {
        id: "user-1".to_string(),
        email: "user@test.com".to_string(),
        name: Some("Test User".to_string()),
    }
}

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Starts at an arbitrary fixed instant.
    pub fn fixed() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()),
        })
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// In-memory key-value store. Synchronous locking keeps its futures
/// immediately ready, which the latch-based race tests rely on.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    async fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// Scriptable [`AuthApi`] double.
///
/// Fixed outcomes are configured with the `with_*` builders; a queue of
/// one-shot outcomes pushed via [`push_refresh_result`] is consumed
/// before the fixed refresh outcome, which makes fail-then-succeed
/// sequences trivial to express. The refresh gate lets a test hold every
/// refresh call mid-flight and release them at a chosen point.
///
/// [`push_refresh_result`]: MockAuthApi::push_refresh_result
pub struct MockAuthApi {
    login_response: Option<LoginResponse>,
    login_error: Option<AuthError>,
    refresh_grant: Option<TokenGrant>,
    refresh_error: Option<AuthError>,
    scripted_refreshes: Mutex<VecDeque<AuthResult<TokenGrant>>>,
    profile_user: Option<User>,
    profile_error: Option<AuthError>,
    logout_error: Option<AuthError>,
    gate: watch::Sender<bool>,
    login_count: AtomicU32,
    refresh_count: AtomicU32,
    profile_count: AtomicU32,
    logout_count: AtomicU32,
}

impl MockAuthApi {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            login_response: None,
            login_error: None,
            refresh_grant: None,
            refresh_error: None,
            scripted_refreshes: Mutex::new(VecDeque::new()),
            profile_user: None,
            profile_error: None,
            logout_error: None,
            gate,
            login_count: AtomicU32::new(0),
            refresh_count: AtomicU32::new(0),
            profile_count: AtomicU32::new(0),
            logout_count: AtomicU32::new(0),
        }
    }

    pub fn with_login_success(
        mut self,
        user: User,
        access: &str,
        refresh: &str,
        expires_in: u64,
    ) -> Self {
        self.login_response = Some(LoginResponse {
            user,
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            expires_in,
        });
        self
    }

    pub fn with_login_error(mut self, error: AuthError) -> Self {
        self.login_error = Some(error);
        self
    }

    pub fn with_refresh_grant(mut self, access: &str, refresh: &str, expires_in: u64) -> Self {
        self.refresh_grant = Some(TokenGrant {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            expires_in,
        });
        self
    }

    pub fn with_refresh_error(mut self, error: AuthError) -> Self {
        self.refresh_error = Some(error);
        self
    }

    /// Queues a one-shot refresh outcome consumed before the fixed one.
    pub fn push_refresh_result(self, result: AuthResult<TokenGrant>) -> Self {
        self.scripted_refreshes.lock().unwrap().push_back(result);
        self
    }

    pub fn with_profile_user(mut self, user: User) -> Self {
        self.profile_user = Some(user);
        self
    }

    pub fn with_profile_error(mut self, error: AuthError) -> Self {
        self.profile_error = Some(error);
        self
    }

    pub fn with_logout_error(mut self, error: AuthError) -> Self {
        self.logout_error = Some(error);
        self
    }

    /// Makes every subsequent refresh call block until released.
    pub fn hold_refresh(&self) {
        self.gate.send_replace(false);
    }

    /// Releases refresh calls blocked by [`hold_refresh`].
    ///
    /// [`hold_refresh`]: MockAuthApi::hold_refresh
    pub fn release_refresh(&self) {
        self.gate.send_replace(true);
    }

    pub fn refresh_calls(&self) -> u32 {
        self.refresh_count.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> u32 {
        self.profile_count.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> u32 {
        self.logout_count.load(Ordering::SeqCst)
    }

    async fn wait_for_gate(&self) {
        let mut open = self.gate.subscribe();
        while !*open.borrow_and_update() {
            if open.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for MockAuthApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, _email: &str, _password: &str) -> AuthResult<LoginResponse> {
        self.login_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.login_error {
            return Err(error.clone());
        }
        self.login_response
            .clone()
            .ok_or_else(|| AuthError::invalid_credentials("no login outcome configured"))
    }

    async fn refresh(&self, _refresh_token: &str) -> AuthResult<TokenGrant> {
        self.refresh_count.fetch_add(1, Ordering::SeqCst);
        self.wait_for_gate().await;
        if let Some(result) = self.scripted_refreshes.lock().unwrap().pop_front() {
            return result;
        }
        if let Some(error) = &self.refresh_error {
            return Err(error.clone());
        }
        self.refresh_grant
            .clone()
            .ok_or_else(|| AuthError::refresh_failed("no refresh outcome configured"))
    }

    async fn logout(&self, _access_token: &str) -> AuthResult<()> {
        self.logout_count.fetch_add(1, Ordering::SeqCst);
        match &self.logout_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn fetch_profile(&self, _access_token: &str) -> AuthResult<User> {
        self.profile_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.profile_error {
            return Err(error.clone());
        }
        self.profile_user.clone().ok_or(AuthError::Unauthorized)
    }
}

/// Transport that answers 200 for exactly one bearer token and 401 for
/// everything else.
pub struct BearerCheckedTransport {
    valid: String,
    calls: AtomicU32,
}

impl BearerCheckedTransport {
    pub fn accepting(valid_token: &str) -> Self {
        Self {
            valid: format!("Bearer {valid_token}"),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApiTransport for BearerCheckedTransport {
    async fn execute(&self, request: ApiRequest) -> AuthResult<ApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let authorized = request
            .headers
            .iter()
            .any(|(name, value)| name.eq_ignore_ascii_case("authorization") && *value == self.valid);
        let status = if authorized { 200 } else { 401 };
        Ok(ApiResponse::new(status, HashMap::new(), Vec::new()))
    }
}
