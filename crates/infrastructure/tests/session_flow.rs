//! End-to-end session flows over the real storage adapters.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use aegis_application::SessionConfig;
use aegis_application::ports::{AuthApi, Clock, KeyValueStore, LoginResponse, TokenGrant};
use aegis_application::session::SessionManager;
use aegis_domain::{AuthResult, SessionState, User};
use aegis_infrastructure::{FileKeyValueStore, SystemClock};

/// Backend stub that accepts everything.
struct StubAuthApi;

fn stub_user() -> User {
    User {
        id: "user-1".to_string(),
        email: "user@test.com".to_string(),
        name: Some("Test User".to_string()),
    }
}

#[async_trait]
impl AuthApi for StubAuthApi {
    async fn login(&self, _email: &str, _password: &str) -> AuthResult<LoginResponse> {
        Ok(LoginResponse {
            user: stub_user(),
            access_token: "access-1".to_string(),
            refresh_token: "refresh-1".to_string(),
            expires_in: 900,
        })
    }

    async fn refresh(&self, _refresh_token: &str) -> AuthResult<TokenGrant> {
        Ok(TokenGrant {
            access_token: "access-2".to_string(),
            refresh_token: "refresh-2".to_string(),
            expires_in: 900,
        })
    }

    async fn logout(&self, _access_token: &str) -> AuthResult<()> {
        Ok(())
    }

    async fn fetch_profile(&self, _access_token: &str) -> AuthResult<User> {
        Ok(stub_user())
    }
}

async fn manager_over(path: &Path) -> Arc<SessionManager> {
    SessionManager::new(
        Arc::new(StubAuthApi),
        Arc::new(FileKeyValueStore::open(path).await) as Arc<dyn KeyValueStore>,
        Arc::new(SystemClock::new()) as Arc<dyn Clock>,
        SessionConfig::default(),
    )
}

#[tokio::test]
async fn login_then_logout_round_trips_through_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let manager = manager_over(&path).await;
    let user = manager.login("user@test.com", "secret", true).await.unwrap();
    assert_eq!(user.email, "user@test.com");
    assert!(manager.is_authenticated());
    assert!(manager.token_store().has_valid_tokens().await);

    manager.logout().await;
    assert_eq!(manager.session().state, SessionState::Unauthenticated);
    assert!(!manager.token_store().has_valid_tokens().await);
    // Remember-me outlives the session.
    assert_eq!(
        manager.remember_me().remembered_email().await.as_deref(),
        Some("user@test.com")
    );
}

#[tokio::test]
async fn persisted_session_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    {
        let manager = manager_over(&path).await;
        manager.login("user@test.com", "secret", false).await.unwrap();
    }

    // A fresh process finds the stored tokens and re-validates them.
    let manager = manager_over(&path).await;
    assert!(manager.check_auth().await);
    assert!(manager.is_authenticated());
}
