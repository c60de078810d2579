use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha1::Sha1;
use url::Url;

use super::TweetPublisher;
use crate::credentials::TwitterCredentials;
use crate::error::Error;
use crate::http;
use crate::pkce;
use crate::types::{Provider, PublishedId};

const DEFAULT_API_URL: &str = "https://api.twitter.com/";

type HmacSha1 = Hmac<Sha1>;

/// Twitter v2 client signing requests with the application's own
/// OAuth 1.0a user-context credentials.
///
/// Every tweet is published from the single account those credentials
/// belong to, whoever is logged in.
pub struct TwitterClient {
    credentials: TwitterCredentials,
    api_url: Url,
    http: reqwest::Client,
}

impl TwitterClient {
    #[must_use]
    pub fn new(credentials: TwitterCredentials, http: reqwest::Client) -> Self {
        Self {
            credentials,
            api_url: DEFAULT_API_URL.parse().expect("valid default URL"),
            http,
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, url: Url) -> Self {
        self.api_url = url;
        self
    }

    fn authorization_header(&self, method: &str, url: &Url) -> Result<String, Error> {
        let timestamp = time::OffsetDateTime::now_utc().unix_timestamp().to_string();
        let nonce = pkce::nonce();
        let oauth = [
            ("oauth_consumer_key", self.credentials.app_key.as_str()),
            ("oauth_nonce", nonce.as_str()),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.credentials.access_token.as_str()),
            ("oauth_version", "1.0"),
        ];
        let signature = sign(
            method,
            url,
            &oauth,
            &[],
            self.credentials.app_secret.expose(),
            self.credentials.access_secret.expose(),
        )?;

        let fields = oauth
            .iter()
            .copied()
            .chain(std::iter::once(("oauth_signature", signature.as_str())))
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {fields}"))
    }
}

#[derive(Deserialize)]
struct TweetCreated {
    data: TweetData,
}

#[derive(Deserialize)]
struct TweetData {
    id: String,
}

#[async_trait]
impl TweetPublisher for TwitterClient {
    async fn tweet(&self, text: &str) -> Result<PublishedId, Error> {
        let url = http::endpoint(&self.api_url, "2/tweets")?;
        let authorization = self.authorization_header("POST", &url)?;
        let request = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&serde_json::json!({ "text": text }));

        let response = http::send(request, Provider::Twitter, "tweet").await?;
        let created: TweetCreated = http::json(response, Provider::Twitter, "tweet").await?;
        Ok(PublishedId(created.data.id))
    }
}

/// RFC 3986 percent-encoding as OAuth 1.0a requires.
fn encode(s: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(s)
}

/// HMAC-SHA1 signature over the OAuth 1.0a signature base string.
///
/// `params` holds the `oauth_*` protocol parameters; `extra` holds query or
/// form parameters that are part of the signed request (JSON bodies are not).
fn sign(
    method: &str,
    url: &Url,
    params: &[(&str, &str)],
    extra: &[(&str, &str)],
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, Error> {
    let mut base_url = url.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);

    let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .chain(extra.iter())
        .map(|(k, v)| (encode(k).into_owned(), encode(v).into_owned()))
        .chain(
            query
                .iter()
                .map(|(k, v)| (encode(k).into_owned(), encode(v).into_owned())),
        )
        .collect();
    pairs.sort();

    let parameter_string = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let base_string = format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(base_url.as_str()),
        encode(&parameter_string)
    );
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| Error::Config(format!("Twitter signing key: {e}")))?;
    mac.update(base_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
