//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and external
//! systems. Each port is a trait implemented by an adapter in the
//! infrastructure layer, or by a mock in tests.

mod auth_api;
mod clock;
mod key_value;
mod transport;

pub use auth_api::{AuthApi, LoginResponse, TokenGrant};
pub use clock::Clock;
pub use key_value::KeyValueStore;
pub use transport::ApiTransport;
