//! Session lifecycle: shared state, remember-me, and the manager.

mod manager;
mod remember;
mod state;

pub use manager::{RenewalHandle, SessionManager};
pub use remember::RememberMeStore;
pub use state::SharedSession;
