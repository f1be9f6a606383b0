//! Token storage, single-flight refresh, and request authorization.

mod authorizer;
mod refresh;
mod token_store;

pub use authorizer::RequestAuthorizer;
pub use refresh::{ReplayFn, RefreshCoordinator};
pub use token_store::TokenStore;
