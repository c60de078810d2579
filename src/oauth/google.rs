use async_trait::async_trait;
use url::Url;

use super::{AuthProvider, AuthorizationRequest, TokenResponse, exchange_failure};
use crate::credentials::GoogleCredentials;
use crate::error::Error;
use crate::http;
use crate::pkce::LoginChallenge;
use crate::types::{Identity, Provider, Secret};

const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const YOUTUBE_UPLOAD_SCOPE: &str = "https://www.googleapis.com/auth/youtube.upload";

/// Google OAuth adapter for YouTube uploads.
///
/// Requests offline access so a refresh token is issued, and only the
/// upload scope.
pub struct GoogleAuth {
    client_id: String,
    client_secret: Secret,
    redirect_uri: Url,
    auth_url: Url,
    token_url: Url,
    scopes: Vec<String>,
    http: reqwest::Client,
}

impl GoogleAuth {
    /// Endpoints from the client descriptor win over the built-in defaults.
    #[must_use]
    pub fn new(credentials: &GoogleCredentials, http: reqwest::Client) -> Self {
        Self {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            redirect_uri: credentials.redirect_uri.clone(),
            auth_url: credentials
                .auth_uri
                .clone()
                .unwrap_or_else(|| DEFAULT_AUTH_URL.parse().expect("valid default URL")),
            token_url: credentials
                .token_uri
                .clone()
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.parse().expect("valid default URL")),
            scopes: vec![YOUTUBE_UPLOAD_SCOPE.into()],
            http,
        }
    }

    #[must_use]
    pub fn with_auth_url(mut self, url: Url) -> Self {
        self.auth_url = url;
        self
    }

    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
        operation: &'static str,
    ) -> Result<TokenResponse, Error> {
        let request = self.http.post(self.token_url.clone()).form(params);
        let response = http::send(request, Provider::Google, operation).await?;
        http::json(response, Provider::Google, operation).await
    }
}

#[async_trait]
impl AuthProvider for GoogleAuth {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn authorization_url(&self) -> AuthorizationRequest {
        let challenge = LoginChallenge::generate();
        let code_challenge = challenge.code_challenge();
        let scope = self.scopes.join(" ");

        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("scope", &scope)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", &challenge.state)
            .append_pair("code_challenge", &code_challenge)
            .append_pair("code_challenge_method", "S256");

        AuthorizationRequest {
            url: url.into(),
            challenge,
        }
    }

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<Identity, Error> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose()),
            ("code_verifier", code_verifier),
        ];

        let token = self
            .token_request(&params, "token exchange")
            .await
            .map_err(|e| exchange_failure(Provider::Google, e))?;

        Ok(Identity::new(Provider::Google, Secret::new(token.access_token))
            .with_refresh_token(token.refresh_token.map(Secret::new))
            .expiring_in(token.expires_in))
    }

    async fn refresh(&self, identity: &Identity) -> Result<Identity, Error> {
        let refresh_token = identity.refresh_token.as_ref().ok_or_else(|| Error::AuthExchange {
            provider: Provider::Google,
            detail: "no refresh token was issued; authorize again".into(),
        })?;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose()),
        ];

        let token = self
            .token_request(&params, "token refresh")
            .await
            .map_err(|e| exchange_failure(Provider::Google, e))?;

        // Google usually omits the refresh token on refresh; keep the old one.
        let refresh_token = token
            .refresh_token
            .map(Secret::new)
            .or_else(|| identity.refresh_token.clone());

        Ok(Identity::new(Provider::Google, Secret::new(token.access_token))
            .with_refresh_token(refresh_token)
            .expiring_in(token.expires_in))
    }
}
