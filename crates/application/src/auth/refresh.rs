//! Single-flight token refresh.
//!
//! At most one refresh network call exists system-wide. Every caller
//! that asks for a refresh while one is pending joins the same flight
//! and receives the same outcome; requests that bounced on a 401 queue a
//! replay closure behind the flight and are released in FIFO order once
//! it settles.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{Mutex, oneshot};
use tracing::{debug, warn};

use aegis_domain::{ApiResponse, AuthError, AuthResult};

use crate::auth::TokenStore;
use crate::events::{SessionEvent, SessionEvents};
use crate::ports::AuthApi;
use crate::session::SharedSession;

/// Future produced by a replay closure.
type ReplayFuture = Pin<Box<dyn Future<Output = AuthResult<ApiResponse>> + Send>>;

/// A deferred retry of a 401-bounced request. Receives the fresh access
/// token once the refresh settles.
pub type ReplayFn = Box<dyn FnOnce(String) -> ReplayFuture + Send>;

/// A request waiting for the in-flight refresh. Settled exactly once:
/// replayed on success, rejected on failure.
struct QueuedRequest {
    replay: ReplayFn,
    tx: oneshot::Sender<AuthResult<ApiResponse>>,
}

/// State shared by all callers of the coordinator. The mutex makes the
/// check-and-set of `in_flight` atomic, which is the whole single-flight
/// guarantee.
#[derive(Default)]
struct FlightState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<AuthResult<String>>>,
    queue: VecDeque<QueuedRequest>,
}

/// Single-flight executor for token renewal.
pub struct RefreshCoordinator {
    api: Arc<dyn AuthApi>,
    tokens: Arc<TokenStore>,
    session: SharedSession,
    events: SessionEvents,
    flight: Arc<Mutex<FlightState>>,
}

impl RefreshCoordinator {
    /// Creates a coordinator.
    #[must_use]
    pub fn new(
        api: Arc<dyn AuthApi>,
        tokens: Arc<TokenStore>,
        session: SharedSession,
        events: SessionEvents,
    ) -> Self {
        Self {
            api,
            tokens,
            session,
            events,
            flight: Arc::new(Mutex::new(FlightState::default())),
        }
    }

    /// Refreshes the token pair, returning the new access token.
    ///
    /// If a refresh is already in flight the caller joins it instead of
    /// issuing a second network call.
    ///
    /// # Errors
    /// `RefreshFailed` when the backend invalidates the refresh token
    /// (tokens are cleared and the session forced to `Unauthenticated`),
    /// `Network` for transient transport failures (token state is left
    /// intact), `Stale` when the session changed mid-flight.
    pub async fn refresh(&self) -> AuthResult<String> {
        let rx = {
            let mut flight = self.flight.lock().await;
            let (tx, rx) = oneshot::channel();
            flight.waiters.push(tx);
            if !flight.in_flight {
                flight.in_flight = true;
                self.spawn_flight();
            }
            rx
        };

        // The flight task settles every waiter exactly once; a dropped
        // sender would mean the task panicked.
        rx.await.unwrap_or(Err(AuthError::Stale))
    }

    /// Queues a 401-bounced request behind the refresh and returns the
    /// replayed outcome.
    ///
    /// # Errors
    /// The refresh failure when the flight settles unsuccessfully, or
    /// whatever the replayed call itself produces.
    pub(crate) async fn replay_after_refresh(&self, replay: ReplayFn) -> AuthResult<ApiResponse> {
        let rx = {
            let mut flight = self.flight.lock().await;
            let (tx, rx) = oneshot::channel();
            flight.queue.push_back(QueuedRequest { replay, tx });
            if !flight.in_flight {
                flight.in_flight = true;
                self.spawn_flight();
            }
            rx
        };

        rx.await.unwrap_or(Err(AuthError::Stale))
    }

    /// Spawns the refresh as a detached task, so a caller being
    /// cancelled mid-await can never leave the in-flight flag wedged.
    fn spawn_flight(&self) {
        let api = Arc::clone(&self.api);
        let tokens = Arc::clone(&self.tokens);
        let session = self.session.clone();
        let events = self.events.clone();
        let flight = Arc::clone(&self.flight);

        tokio::spawn(async move {
            let outcome = Self::run_refresh(&*api, &tokens, &session, &events).await;
            Self::settle(&flight, outcome).await;
        });
    }

    /// Performs the actual refresh call and applies its result to the
    /// token store, guarded against the store changing mid-flight.
    async fn run_refresh(
        api: &dyn AuthApi,
        tokens: &TokenStore,
        session: &SharedSession,
        events: &SessionEvents,
    ) -> AuthResult<String> {
        let Some(refresh_token) = tokens.refresh_token().await else {
            return Err(AuthError::refresh_failed("no refresh token available"));
        };

        let epoch = tokens.epoch();
        match api.refresh(&refresh_token).await {
            Ok(grant) => {
                let applied = tokens
                    .set_tokens_if_unchanged(
                        &grant.access_token,
                        &grant.refresh_token,
                        grant.expires_in,
                        epoch,
                    )
                    .await;
                if !applied {
                    debug!("discarding refresh result: token store changed mid-flight");
                    return Err(AuthError::Stale);
                }
                events.emit(SessionEvent::TokenRefreshed {
                    expires_in: grant.expires_in,
                });
                Ok(grant.access_token)
            }
            Err(error) if error.is_transient() => {
                // Transient: leave tokens alone, the renewal loop's
                // retry policy decides what happens next.
                warn!(%error, "token refresh hit a transient failure");
                events.emit(SessionEvent::RefreshFailed {
                    error: error.clone(),
                });
                Err(error)
            }
            Err(error) => {
                if tokens.clear_tokens_if_unchanged(epoch).await {
                    // The backend invalidated the refresh token: the
                    // session is over.
                    warn!(%error, "refresh token rejected, forcing logout");
                    session.unauthenticated(Some(error.to_string()));
                    events.emit(SessionEvent::SessionInvalidated);
                    Err(AuthError::refresh_failed(error.to_string()))
                } else {
                    debug!("discarding refresh failure: token store changed mid-flight");
                    Err(AuthError::Stale)
                }
            }
        }
    }

    /// Releases every waiter and queued request with the flight outcome.
    async fn settle(flight: &Mutex<FlightState>, outcome: AuthResult<String>) {
        let (waiters, queue) = {
            let mut flight = flight.lock().await;
            flight.in_flight = false;
            (
                std::mem::take(&mut flight.waiters),
                std::mem::take(&mut flight.queue),
            )
        };

        match outcome {
            Ok(access_token) => {
                for tx in waiters {
                    let _ = tx.send(Ok(access_token.clone()));
                }
                // Replays spawn in FIFO enqueue order; their completions
                // carry no ordering guarantee.
                for queued in queue {
                    let future = (queued.replay)(access_token.clone());
                    let tx = queued.tx;
                    tokio::spawn(async move {
                        let _ = tx.send(future.await);
                    });
                }
            }
            Err(error) => {
                for tx in waiters {
                    let _ = tx.send(Err(error.clone()));
                }
                for queued in queue {
                    let _ = queued.tx.send(Err(error.clone()));
                }
            }
        }
    }
}
