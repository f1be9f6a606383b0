//! Aegis Domain - Core session types
//!
//! This crate defines the domain model for the Aegis session client.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod remember;
pub mod request;
pub mod session;
pub mod token;

pub use error::{AuthError, AuthResult};
pub use remember::RememberMePreference;
pub use request::{ApiRequest, ApiResponse, HttpMethod};
pub use session::{Session, SessionState, User};
pub use token::TokenPair;
