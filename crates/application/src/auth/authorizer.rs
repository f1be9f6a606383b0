//! Request authorization and the 401 retry protocol.
//!
//! Every outbound API call any collaborator makes goes through here, so
//! the proactive pre-expiry refresh and the queue-and-retry-once
//! protocol apply uniformly.

use std::sync::Arc;

use tracing::debug;

use aegis_domain::{ApiRequest, ApiResponse, AuthError, AuthResult};

use crate::auth::refresh::{RefreshCoordinator, ReplayFn};
use crate::auth::token_store::TokenStore;
use crate::ports::ApiTransport;

/// Attaches credentials to outbound calls and recovers from token races.
///
/// Never writes token state itself; recovery is delegated to the
/// refresh coordinator.
pub struct RequestAuthorizer {
    transport: Arc<dyn ApiTransport>,
    tokens: Arc<TokenStore>,
    refresher: Arc<RefreshCoordinator>,
}

impl RequestAuthorizer {
    /// Creates an authorizer.
    #[must_use]
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        tokens: Arc<TokenStore>,
        refresher: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            transport,
            tokens,
            refresher,
        }
    }

    /// Executes an authorized request.
    ///
    /// If the access token is already expired the refresh happens before
    /// the request is sent, avoiding a guaranteed 401 round trip. A 401
    /// that arrives anyway queues the request behind the shared refresh
    /// and replays it once with the fresh token; a second 401 after that
    /// is surfaced as [`AuthError::Unauthorized`] rather than looping.
    ///
    /// # Errors
    /// Transport failures, refresh failures, or `Unauthorized` when the
    /// replayed request is rejected again.
    pub async fn send(&self, request: ApiRequest) -> AuthResult<ApiResponse> {
        if self.tokens.is_access_token_expired().await {
            debug!(path = %request.path, "access token expired, refreshing before send");
            self.refresher.refresh().await?;
        }

        let access_token = self
            .tokens
            .access_token()
            .await
            .ok_or_else(|| AuthError::refresh_failed("no access token after refresh"))?;

        let response = self
            .transport
            .execute(request.clone().with_bearer(&access_token))
            .await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        // The token raced its expiry or was invalidated server-side.
        // Queue a single replay behind the shared refresh.
        debug!(path = %request.path, "request bounced with 401, queueing replay");
        let transport = Arc::clone(&self.transport);
        let replay: ReplayFn = Box::new(move |fresh_token: String| {
            let retried = request.with_bearer(&fresh_token);
            Box::pin(async move { transport.execute(retried).await })
        });

        let replayed = self.refresher.replay_after_refresh(replay).await?;
        if replayed.is_unauthorized() {
            // Already retried once with a fresh token; do not loop.
            return Err(AuthError::Unauthorized);
        }
        Ok(replayed)
    }
}
