//! Generic request transport over reqwest.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};

use aegis_application::ports::ApiTransport;
use aegis_domain::{ApiRequest, ApiResponse, AuthError, AuthResult, HttpMethod};

use super::with_trailing_slash;

/// [`ApiTransport`] implementation wrapping `reqwest::Client`.
///
/// HTTP statuses, 401 included, come back inside [`ApiResponse`]; `Err`
/// is reserved for transport-level failures so the request authorizer
/// can drive its retry protocol off the status alone.
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Creates a transport for the backend rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        let client = Client::builder()
            .user_agent(concat!("Aegis/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_client(client, base_url)
    }

    /// Creates a transport over a caller-configured reqwest client.
    #[must_use]
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url: with_trailing_slash(base_url),
        }
    }

    /// Converts the domain method to a reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn request_url(&self, path: &str) -> AuthResult<Url> {
        // Leading slashes would make Url::join discard the base path.
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AuthError::network(format!("invalid request path {path}: {e}")))
    }
}

#[async_trait]
impl ApiTransport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> AuthResult<ApiResponse> {
        let url = self.request_url(&request.path)?;
        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AuthError::network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::network(format!("failed to read response body: {e}")))?
            .to_vec();

        Ok(ApiResponse::new(status, headers, body))
    }
}
