//! Session lifecycle manager.
//!
//! The top-level orchestrator UI collaborators talk to: explicit login
//! and logout, startup re-validation, and the background renewal loop
//! that keeps the access token fresh while the session lasts.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use aegis_domain::{AuthError, AuthResult, Session, SessionState, User};

use crate::auth::{RefreshCoordinator, RequestAuthorizer, TokenStore};
use crate::config::SessionConfig;
use crate::events::{SessionEvent, SessionEvents};
use crate::ports::{ApiTransport, AuthApi, Clock, KeyValueStore};
use crate::session::remember::RememberMeStore;
use crate::session::state::SharedSession;

/// Cancellable handle to the background renewal task.
///
/// Aborting stops all future ticks; a refresh already in flight runs to
/// completion inside the coordinator's detached task, where the epoch
/// guard discards its result if the session was torn down meanwhile.
#[derive(Debug)]
pub struct RenewalHandle {
    task: JoinHandle<()>,
}

impl RenewalHandle {
    /// Stops the loop.
    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for RenewalHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Top-level session state machine and owner of the renewal loop.
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    tokens: Arc<TokenStore>,
    refresher: Arc<RefreshCoordinator>,
    remember: RememberMeStore,
    session: SharedSession,
    events: SessionEvents,
    config: SessionConfig,
    renewal: Mutex<Option<RenewalHandle>>,
}

impl SessionManager {
    /// Wires up a manager and its collaborators over the injected ports.
    #[must_use]
    pub fn new(
        api: Arc<dyn AuthApi>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Arc<Self> {
        let tokens = Arc::new(TokenStore::with_skew(
            Arc::clone(&store),
            Arc::clone(&clock),
            config.expiry_skew_secs,
        ));
        let session = SharedSession::new();
        let events = SessionEvents::new();
        let refresher = Arc::new(RefreshCoordinator::new(
            Arc::clone(&api),
            Arc::clone(&tokens),
            session.clone(),
            events.clone(),
        ));
        let remember = RememberMeStore::new(store, clock, config.remember_me_horizon_days);

        Arc::new(Self {
            api,
            tokens,
            refresher,
            remember,
            session,
            events,
            config,
            renewal: Mutex::new(None),
        })
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session.snapshot()
    }

    /// Subscribes to session state changes.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Subscribes to lifecycle events.
    #[must_use]
    pub fn events(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// True while a verified session is in place.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// The token store, for wiring further collaborators.
    #[must_use]
    pub const fn token_store(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// The remember-me store.
    #[must_use]
    pub const fn remember_me(&self) -> &RememberMeStore {
        &self.remember
    }

    /// Builds a request authorizer sharing this manager's token store
    /// and refresh coordinator.
    #[must_use]
    pub fn authorizer(&self, transport: Arc<dyn ApiTransport>) -> RequestAuthorizer {
        RequestAuthorizer::new(transport, Arc::clone(&self.tokens), Arc::clone(&self.refresher))
    }

    /// Validates any stored session at startup.
    ///
    /// Refreshes an expired access token, then fetches the profile to
    /// prove the backend still accepts the session. Missing tokens are
    /// not an error, just an unauthenticated start. Any failure performs
    /// a local-only logout and returns false.
    pub async fn check_auth(self: &Arc<Self>) -> bool {
        self.session.begin_initializing();

        if !self.tokens.has_valid_tokens().await {
            debug!("no stored tokens, starting unauthenticated");
            self.session.unauthenticated(None);
            return false;
        }

        if self.tokens.is_access_token_expired().await
            && let Err(error) = self.refresher.refresh().await
        {
            warn!(%error, "startup token refresh failed");
            self.logout_inner(false, Some(error.to_string())).await;
            return false;
        }

        let Some(access_token) = self.tokens.access_token().await else {
            self.session.unauthenticated(None);
            return false;
        };

        match self.api.fetch_profile(&access_token).await {
            Ok(user) => {
                info!(user = %user.email, "session re-validated");
                self.session.authenticated(user);
                self.start_renewal().await;
                true
            }
            Err(error) => {
                // Well-formed but server-invalidated token.
                warn!(%error, "stored session rejected by backend");
                self.logout_inner(false, Some(error.to_string())).await;
                false
            }
        }
    }

    /// Logs in with credentials.
    ///
    /// # Errors
    /// Re-throws the backend failure (`InvalidCredentials`, `Network`)
    /// after a full local cleanup, so a login form can display it.
    pub async fn login(
        self: &Arc<Self>,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> AuthResult<User> {
        match self.api.login(email, password).await {
            Ok(response) => {
                self.tokens
                    .set_tokens(
                        &response.access_token,
                        &response.refresh_token,
                        response.expires_in,
                    )
                    .await;
                if remember_me {
                    self.remember.set_remember_me(true, email).await;
                }
                self.session.authenticated(response.user.clone());
                self.events.emit(SessionEvent::LoggedIn {
                    email: email.to_string(),
                });
                info!(user = %email, "login succeeded");
                self.start_renewal().await;
                Ok(response.user)
            }
            Err(error) => {
                warn!(%error, "login failed");
                self.logout_inner(false, Some(error.to_string())).await;
                Err(error)
            }
        }
    }

    /// Logs out, notifying the backend best-effort.
    pub async fn logout(&self) {
        self.logout_inner(true, None).await;
    }

    /// Manually triggers a token refresh through the shared coordinator.
    ///
    /// # Errors
    /// Same failure modes as [`RefreshCoordinator::refresh`].
    pub async fn refresh_token(&self) -> AuthResult<()> {
        self.refresher.refresh().await.map(|_| ())
    }

    /// `check_auth` behind a boxed future. The renewal loop spawns this
    /// for its final re-validation; boxing breaks the otherwise
    /// recursive future type between the loop, `check_auth`, and
    /// `start_renewal`.
    fn revalidate(self: Arc<Self>) -> Pin<Box<dyn Future<Output = bool> + Send>> {
        Box::pin(async move { self.check_auth().await })
    }

    async fn logout_inner(&self, call_backend: bool, error: Option<String>) {
        self.stop_renewal().await;

        if call_backend
            && let Some(access_token) = self.tokens.access_token().await
            && let Err(error) = self.api.logout(&access_token).await
        {
            // Best-effort: the local session dies either way.
            warn!(%error, "backend logout failed");
        }

        self.tokens.clear_tokens().await;
        if !self.remember.is_enabled().await {
            self.remember.clear().await;
        }
        self.session.unauthenticated(error);
        self.events.emit(SessionEvent::LoggedOut);
    }

    /// Starts a fresh renewal loop, cancelling any previous one. The
    /// slot may still hold the handle of a loop that already exited (a
    /// fatal refresh ends the loop without going through `logout`), so
    /// starting always replaces rather than skipping.
    async fn start_renewal(self: &Arc<Self>) {
        let manager = Arc::downgrade(self);
        let config = self.config.clone();
        let task = tokio::spawn(renewal_loop(manager, config));
        let previous = self.renewal.lock().await.replace(RenewalHandle { task });
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    /// Stops the renewal loop.
    async fn stop_renewal(&self) {
        if let Some(handle) = self.renewal.lock().await.take() {
            handle.cancel();
        }
    }
}

/// Background renewal: refresh the access token shortly before it
/// expires, with bounded retries on transient failures and one final
/// re-validation before giving up.
async fn renewal_loop(manager: Weak<SessionManager>, config: SessionConfig) {
    let mut attempt: u32 = 0;
    loop {
        let delay = if attempt == 0 {
            config.renewal_interval()
        } else {
            config.retry_delay()
        };
        tokio::time::sleep(delay).await;

        let Some(manager) = manager.upgrade() else {
            return;
        };
        if manager.session.state() != SessionState::Authenticated {
            return;
        }
        if !manager.tokens.is_access_token_expired().await {
            attempt = 0;
            continue;
        }

        match manager.refresher.refresh().await {
            Ok(_) => {
                debug!("background renewal refreshed the access token");
                attempt = 0;
            }
            Err(error @ (AuthError::RefreshFailed { .. } | AuthError::Stale)) => {
                // Fatal or raced by a logout; the coordinator has
                // already settled the session.
                debug!(%error, "background renewal stopping");
                return;
            }
            Err(error) => {
                attempt += 1;
                warn!(attempt, %error, "background renewal failed");
                if attempt >= config.max_retry_attempts {
                    manager
                        .events
                        .emit(SessionEvent::RenewalExhausted { attempts: attempt });
                    // Final arbiter: a full re-validation. Runs on its
                    // own task so a forced logout can abort this loop
                    // without interrupting its own cleanup.
                    let revalidation = tokio::spawn(Arc::clone(&manager).revalidate());
                    if matches!(revalidation.await, Ok(true)) {
                        attempt = 0;
                    } else {
                        warn!(
                            attempts = attempt,
                            "renewal retries exhausted, session closed"
                        );
                        return;
                    }
                }
            }
        }
    }
}
