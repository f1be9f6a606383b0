//! Authentication backend port.
//!
//! The four endpoint contracts the session core consumes. Adapters own
//! the wire format; the port speaks domain types and `AuthError`.

use async_trait::async_trait;
use serde::Deserialize;

use aegis_domain::{AuthResult, User};

/// Successful `POST /auth/login` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// The authenticated user.
    pub user: User,
    /// Fresh access token.
    pub access_token: String,
    /// Fresh refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Successful `POST /auth/refresh` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    /// Fresh access token.
    pub access_token: String,
    /// Rotated refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Port for the authentication endpoints of the backend.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for a token pair and the user record.
    ///
    /// # Errors
    /// `InvalidCredentials` if the backend rejects the credentials,
    /// `Network` for transport failures.
    async fn login(&self, email: &str, password: &str) -> AuthResult<LoginResponse>;

    /// Exchanges a refresh token for a new token pair.
    ///
    /// # Errors
    /// `RefreshFailed` if the backend invalidates the refresh token
    /// (fatal for the session), `Network` for transport failures.
    async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenGrant>;

    /// Invalidates the session server-side. Best-effort.
    ///
    /// # Errors
    /// `Network` for transport failures; callers log and continue.
    async fn logout(&self, access_token: &str) -> AuthResult<()>;

    /// Fetches the current user, proving the token is actually accepted.
    ///
    /// # Errors
    /// `Unauthorized` if the backend rejects the token, `Network` for
    /// transport failures.
    async fn fetch_profile(&self, access_token: &str) -> AuthResult<User>;
}
