//! Auth endpoint adapter.
//!
//! Implements the [`AuthApi`] port against the backend's JSON auth
//! endpoints. HTTP statuses are folded into the domain error taxonomy
//! here, so nothing above this layer ever inspects a status code for an
//! auth endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use aegis_application::ports::{AuthApi, LoginResponse, TokenGrant};
use aegis_domain::{AuthError, AuthResult, User};

use super::with_trailing_slash;

/// `POST /auth/login` body.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// `POST /auth/refresh` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Error payload the backend attaches to non-2xx auth responses. Both
/// field names are seen in the wild, so both are accepted.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

/// Reqwest-backed implementation of the [`AuthApi`] port.
pub struct HttpAuthApi {
    client: Client,
    base_url: Url,
}

impl HttpAuthApi {
    /// Creates a client for the backend rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        let client = Client::builder()
            .user_agent(concat!("Aegis/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_client(client, base_url)
    }

    /// Creates an adapter over a caller-configured reqwest client.
    #[must_use]
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url: with_trailing_slash(base_url),
        }
    }

    fn endpoint(&self, path: &str) -> AuthResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AuthError::network(format!("invalid endpoint {path}: {e}")))
    }

    /// Pulls a human-readable message out of an error response body.
    async fn failure_message(response: reqwest::Response) -> String {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| format!("request failed with status {status}"))
    }

    fn map_login_status(status: StatusCode, message: String) -> AuthError {
        match status.as_u16() {
            400 | 401 | 403 | 422 => AuthError::invalid_credentials(message),
            _ => AuthError::network(message),
        }
    }

    fn map_refresh_status(status: StatusCode, message: String) -> AuthError {
        match status.as_u16() {
            400 | 401 | 403 => AuthError::refresh_failed(message),
            _ => AuthError::network(message),
        }
    }

    fn map_profile_status(status: StatusCode, message: String) -> AuthError {
        match status.as_u16() {
            401 | 403 => AuthError::Unauthorized,
            _ => AuthError::network(message),
        }
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &str, password: &str) -> AuthResult<LoginResponse> {
        let response = self
            .client
            .post(self.endpoint("auth/login")?)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| AuthError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_login_status(
                status,
                Self::failure_message(response).await,
            ));
        }

        response
            .json::<LoginResponse>()
            .await
            .map_err(|e| AuthError::network(format!("malformed login response: {e}")))
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenGrant> {
        debug!("requesting token refresh");
        let response = self
            .client
            .post(self.endpoint("auth/refresh")?)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| AuthError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_refresh_status(
                status,
                Self::failure_message(response).await,
            ));
        }

        response
            .json::<TokenGrant>()
            .await
            .map_err(|e| AuthError::network(format!("malformed refresh response: {e}")))
    }

    async fn logout(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .client
            .post(self.endpoint("auth/logout")?)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::network(Self::failure_message(response).await));
        }
        Ok(())
    }

    async fn fetch_profile(&self, access_token: &str) -> AuthResult<User> {
        let response = self
            .client
            .get(self.endpoint("user/profile")?)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_profile_status(
                status,
                Self::failure_message(response).await,
            ));
        }

        response
            .json::<User>()
            .await
            .map_err(|e| AuthError::network(format!("malformed profile response: {e}")))
    }
}
