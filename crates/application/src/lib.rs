//! Aegis Application - Session lifecycle coordination
//!
//! This crate owns the moving parts of the session core: the token
//! store, the single-flight refresh coordinator, the request authorizer,
//! and the lifecycle manager with its background renewal loop. External
//! concerns (HTTP transport, persistent storage, wall-clock time) enter
//! through the ports module and are implemented in the infrastructure
//! layer.

pub mod auth;
pub mod config;
pub mod events;
pub mod ports;
pub mod session;

#[cfg(test)]
mod test_support;

pub use auth::{RefreshCoordinator, RequestAuthorizer, TokenStore};
pub use config::SessionConfig;
pub use events::{SessionEvent, SessionEvents};
pub use session::{RememberMeStore, RenewalHandle, SessionManager, SharedSession};
