use std::time::Duration;

use crate::error::Error;
use crate::types::Provider;

/// Build the shared outbound client. Every provider call is bounded by `timeout`.
///
/// # Errors
///
/// Returns [`Error::Http`] if the TLS backend cannot be initialised.
pub fn client(timeout: Duration) -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("crosspost/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(Into::into)
}

/// Checks HTTP response status; returns the response on success or a
/// provider error carrying the status and body.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    provider: Provider,
    operation: &'static str,
) -> Result<reqwest::Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(Error::provider(provider, operation, Some(status), body))
}

/// Send a request, mapping transport failures to the provider's error kind.
pub(crate) async fn send(
    request: reqwest::RequestBuilder,
    provider: Provider,
    operation: &'static str,
) -> Result<reqwest::Response, Error> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::transport(provider, operation, e))?;
    ensure_success(response, provider, operation).await
}

/// Decode a successful JSON body.
pub(crate) async fn json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    provider: Provider,
    operation: &'static str,
) -> Result<T, Error> {
    response
        .json::<T>()
        .await
        .map_err(|e| Error::transport(provider, operation, e))
}

/// Resolve `path` relative to a base URL, treating the base as a directory.
pub(crate) fn endpoint(base: &url::Url, path: &str) -> Result<url::Url, Error> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|e| Error::Config(format!("{base}{path}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_versioned_base_path() {
        let base: url::Url = "https://graph.facebook.com/v19.0".parse().unwrap();
        assert_eq!(
            endpoint(&base, "/me/accounts").unwrap().as_str(),
            "https://graph.facebook.com/v19.0/me/accounts"
        );
    }

    #[test]
    fn endpoint_on_bare_host() {
        let base: url::Url = "http://127.0.0.1:9000".parse().unwrap();
        assert_eq!(
            endpoint(&base, "2/tweets").unwrap().as_str(),
            "http://127.0.0.1:9000/2/tweets"
        );
    }
}
