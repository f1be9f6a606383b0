//! HTTP adapters for the backend API.
//!
//! Two reqwest-backed adapters: [`HttpAuthApi`] speaks the four auth
//! endpoints, [`ReqwestTransport`] executes arbitrary authorized calls
//! for the request authorizer.

mod auth_client;
mod transport;

pub use auth_client::HttpAuthApi;
pub use transport::ReqwestTransport;

/// Appends a trailing slash so `Url::join` treats the last path segment
/// as a directory instead of replacing it.
fn with_trailing_slash(mut url: url::Url) -> url::Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_trailing_slash_is_appended_once() {
        let url = url::Url::parse("https://api.example.com/v1").unwrap();
        assert_eq!(with_trailing_slash(url).as_str(), "https://api.example.com/v1/");

        let url = url::Url::parse("https://api.example.com/v1/").unwrap();
        assert_eq!(with_trailing_slash(url).as_str(), "https://api.example.com/v1/");
    }
}
