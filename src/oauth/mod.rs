//! Provider login adapters.
//!
//! Each adapter builds the provider's consent URL and turns the authorization
//! code from the callback into an [`Identity`].

mod facebook;
mod google;

use async_trait::async_trait;
use serde::Deserialize;

pub use facebook::FacebookAuth;
pub use google::GoogleAuth;

use crate::error::Error;
use crate::pkce::LoginChallenge;
use crate::types::{Identity, Provider};

/// Consent URL plus the per-attempt secrets to hold until the callback.
#[non_exhaustive]
pub struct AuthorizationRequest {
    pub url: String,
    pub challenge: LoginChallenge,
}

/// Token endpoint response shared by Facebook and Google.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    /// Which provider this adapter logs in to.
    fn provider(&self) -> Provider;

    /// Generate a consent URL with a fresh state (and PKCE challenge where supported).
    fn authorization_url(&self) -> AuthorizationRequest;

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthExchange`] when the provider rejects the code
    /// (expired, already used, mismatched redirect URI), or
    /// [`Error::Timeout`] when it does not answer in time.
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<Identity, Error>;

    /// Obtain a new access token for an identity holding a refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthExchange`] if the provider has no refresh flow or
    /// rejects the refresh token.
    async fn refresh(&self, identity: &Identity) -> Result<Identity, Error> {
        let _ = identity;
        Err(Error::AuthExchange {
            provider: self.provider(),
            detail: "token refresh is not supported".into(),
        })
    }
}

/// Re-labels any non-timeout failure as an authorization failure of `provider`.
pub(crate) fn exchange_failure(provider: Provider, err: Error) -> Error {
    match err {
        Error::Timeout { .. } => err,
        other => Error::AuthExchange {
            provider,
            detail: other.to_string(),
        },
    }
}
