use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{AuthProvider, AuthorizationRequest, TokenResponse, exchange_failure};
use crate::credentials::FacebookCredentials;
use crate::error::Error;
use crate::http;
use crate::pkce::LoginChallenge;
use crate::types::{Identity, Profile, Provider, Secret};

const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com/v19.0/";
const DEFAULT_DIALOG_URL: &str = "https://www.facebook.com/v19.0/dialog/oauth";
const PROFILE_FIELDS: &str = "id,name,picture,email";

/// Facebook Login adapter.
///
/// Requests the page permissions needed to list the user's pages and post to
/// their feeds.
pub struct FacebookAuth {
    app_id: String,
    app_secret: Secret,
    redirect_uri: Url,
    dialog_url: Url,
    graph_url: Url,
    scopes: Vec<String>,
    http: reqwest::Client,
}

impl FacebookAuth {
    #[must_use]
    pub fn new(credentials: &FacebookCredentials, http: reqwest::Client) -> Self {
        Self {
            app_id: credentials.app_id.clone(),
            app_secret: credentials.app_secret.clone(),
            redirect_uri: credentials.callback_url.clone(),
            dialog_url: DEFAULT_DIALOG_URL.parse().expect("valid default URL"),
            graph_url: DEFAULT_GRAPH_URL.parse().expect("valid default URL"),
            scopes: vec![
                "pages_manage_posts".into(),
                "pages_read_engagement".into(),
                "pages_show_list".into(),
            ],
            http,
        }
    }

    /// Override the login dialog endpoint.
    #[must_use]
    pub fn with_dialog_url(mut self, url: Url) -> Self {
        self.dialog_url = url;
        self
    }

    /// Override the Graph API base URL.
    #[must_use]
    pub fn with_graph_url(mut self, url: Url) -> Self {
        self.graph_url = url;
        self
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, Error> {
        let url = http::endpoint(&self.graph_url, "me")?;
        let request = self
            .http
            .get(url)
            .query(&[("fields", PROFILE_FIELDS), ("access_token", access_token)]);
        let response = http::send(request, Provider::Facebook, "profile request").await?;
        let me: GraphMe = http::json(response, Provider::Facebook, "profile request").await?;

        Ok(Profile {
            display_name: me.name.unwrap_or_else(|| me.id.clone()),
            id: me.id,
            photo_url: me.picture.and_then(|p| p.data).map(|d| d.url),
            email: me.email,
        })
    }
}

#[async_trait]
impl AuthProvider for FacebookAuth {
    fn provider(&self) -> Provider {
        Provider::Facebook
    }

    fn authorization_url(&self) -> AuthorizationRequest {
        let challenge = LoginChallenge::generate();
        let scope = self.scopes.join(",");

        let mut url = self.dialog_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.app_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("state", &challenge.state)
            .append_pair("response_type", "code")
            .append_pair("scope", &scope);

        AuthorizationRequest {
            url: url.into(),
            challenge,
        }
    }

    async fn exchange_code(&self, code: &str, _code_verifier: &str) -> Result<Identity, Error> {
        let url = http::endpoint(&self.graph_url, "oauth/access_token")?;
        let request = self.http.get(url).query(&[
            ("client_id", self.app_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_secret", self.app_secret.expose()),
            ("code", code),
        ]);

        let token: TokenResponse = async {
            let response = http::send(request, Provider::Facebook, "token exchange").await?;
            http::json(response, Provider::Facebook, "token exchange").await
        }
        .await
        .map_err(|e| exchange_failure(Provider::Facebook, e))?;

        let profile = self
            .fetch_profile(&token.access_token)
            .await
            .map_err(|e| exchange_failure(Provider::Facebook, e))?;

        Ok(Identity::new(Provider::Facebook, Secret::new(token.access_token))
            .with_profile(profile)
            .expiring_in(token.expires_in))
    }
}

#[derive(Deserialize)]
struct GraphMe {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<GraphPicture>,
}

#[derive(Deserialize)]
struct GraphPicture {
    data: Option<GraphPictureData>,
}

#[derive(Deserialize)]
struct GraphPictureData {
    url: String,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn credentials() -> FacebookCredentials {
        FacebookCredentials {
            app_id: "fb-app".into(),
            app_secret: Secret::new("fb-secret"),
            callback_url: "http://localhost:3000/auth/facebook/callback".parse().unwrap(),
        }
    }

    fn adapter(server: &MockServer) -> FacebookAuth {
        FacebookAuth::new(&credentials(), reqwest::Client::new())
            .with_graph_url(server.uri().parse().unwrap())
    }

    #[test]
    fn authorization_url_carries_client_and_scopes() {
        let auth = FacebookAuth::new(&credentials(), reqwest::Client::new());
        let req = auth.authorization_url();

        let url: Url = req.url.parse().unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |k: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.clone())
        };

        assert!(req.url.starts_with(DEFAULT_DIALOG_URL));
        assert_eq!(get("client_id").as_deref(), Some("fb-app"));
        assert_eq!(
            get("redirect_uri").as_deref(),
            Some("http://localhost:3000/auth/facebook/callback")
        );
        assert_eq!(
            get("scope").as_deref(),
            Some("pages_manage_posts,pages_read_engagement,pages_show_list")
        );
        assert_eq!(get("state"), Some(req.challenge.state.clone()));
    }

    #[tokio::test]
    async fn exchange_code_fetches_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/access_token"))
            .and(query_param("code", "good-code"))
            .and(query_param("client_secret", "fb-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "user-token",
                "token_type": "bearer",
                "expires_in": 5183944
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(query_param("access_token", "user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "1001",
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "picture": {"data": {"url": "https://cdn.example.com/ada.jpg"}}
            })))
            .mount(&server)
            .await;

        let identity = adapter(&server)
            .exchange_code("good-code", "unused")
            .await
            .unwrap();

        assert_eq!(identity.provider, Provider::Facebook);
        assert_eq!(identity.access_token.expose(), "user-token");
        assert_eq!(identity.display_name(), Some("Ada Lovelace"));
        let profile = identity.profile.unwrap();
        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
        assert_eq!(
            profile.photo_url.as_deref(),
            Some("https://cdn.example.com/ada.jpg")
        );
        assert!(identity.expires_at.is_some());
    }

    #[tokio::test]
    async fn rejected_code_is_auth_exchange_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/access_token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "This authorization code has expired.", "code": 100}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = adapter(&server)
            .exchange_code("stale-code", "unused")
            .await
            .unwrap_err();

        assert!(
            matches!(&err, Error::AuthExchange { provider: Provider::Facebook, detail } if detail.contains("expired")),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn refresh_is_unsupported() {
        let server = MockServer::start().await;
        let identity = Identity::new(Provider::Facebook, Secret::new("t"));
        let err = adapter(&server).refresh(&identity).await.unwrap_err();
        assert!(matches!(err, Error::AuthExchange { .. }));
    }
}
