//! API transport port.

use async_trait::async_trait;

use aegis_domain::{ApiRequest, ApiResponse, AuthResult};

/// Port for executing arbitrary API calls.
///
/// Implementations surface HTTP statuses inside [`ApiResponse`] and
/// reserve `Err` for transport failures, so the request authorizer can
/// inspect 401s without unwrapping errors.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Executes the request.
    ///
    /// # Errors
    /// `Network` when the call could not complete at the transport
    /// level (DNS, connect, timeout).
    async fn execute(&self, request: ApiRequest) -> AuthResult<ApiResponse>;
}
