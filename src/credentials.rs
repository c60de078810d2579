//! OAuth client identifiers and application secrets for each provider.
//!
//! Loaded once at startup and read-only afterwards.

use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::Error;
use crate::types::Secret;

const DEFAULT_FACEBOOK_CALLBACK: &str = "http://localhost:3000/auth/facebook/callback";
const DEFAULT_GOOGLE_CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Clone)]
pub struct FacebookCredentials {
    pub app_id: String,
    pub app_secret: Secret,
    pub callback_url: Url,
}

/// Google OAuth client, as described by the console's client descriptor file.
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: Secret,
    pub redirect_uri: Url,
    pub auth_uri: Option<Url>,
    pub token_uri: Option<Url>,
}

/// Application-level Twitter credentials (OAuth 1.0a user context).
#[derive(Debug, Clone)]
pub struct TwitterCredentials {
    pub app_key: String,
    pub app_secret: Secret,
    pub access_token: String,
    pub access_secret: Secret,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub facebook: FacebookCredentials,
    pub google: GoogleCredentials,
    pub twitter: TwitterCredentials,
}

impl Credentials {
    /// Load all provider credentials from the environment.
    ///
    /// # Required env vars
    /// - `FACEBOOK_APP_ID`, `FACEBOOK_APP_SECRET`
    /// - `TWITTER_APP_KEY`, `TWITTER_APP_SECRET`, `TWITTER_ACCESS_TOKEN`, `TWITTER_ACCESS_SECRET`
    ///
    /// # Optional env vars
    /// - `FACEBOOK_CALLBACK_URL`: defaults to the local development callback
    /// - `GOOGLE_CREDENTIALS_FILE`: path to the Google client descriptor (default `credentials.json`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is missing, a URL is invalid,
    /// or the Google descriptor cannot be read.
    pub fn from_env() -> Result<Self, Error> {
        let callback = std::env::var("FACEBOOK_CALLBACK_URL")
            .unwrap_or_else(|_| DEFAULT_FACEBOOK_CALLBACK.to_string());
        let facebook = FacebookCredentials {
            app_id: required("FACEBOOK_APP_ID")?,
            app_secret: Secret::new(required("FACEBOOK_APP_SECRET")?),
            callback_url: callback
                .parse()
                .map_err(|e| Error::Config(format!("FACEBOOK_CALLBACK_URL: {e}")))?,
        };

        let twitter = TwitterCredentials {
            app_key: required("TWITTER_APP_KEY")?,
            app_secret: Secret::new(required("TWITTER_APP_SECRET")?),
            access_token: required("TWITTER_ACCESS_TOKEN")?,
            access_secret: Secret::new(required("TWITTER_ACCESS_SECRET")?),
        };

        let google_file = std::env::var("GOOGLE_CREDENTIALS_FILE")
            .unwrap_or_else(|_| DEFAULT_GOOGLE_CREDENTIALS_FILE.to_string());
        let google = GoogleCredentials::from_file(&google_file)?;

        Ok(Self {
            facebook,
            google,
            twitter,
        })
    }
}

impl GoogleCredentials {
    /// Read a Google client descriptor file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file is unreadable or malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse the descriptor JSON. Both `web` and `installed` client kinds are accepted;
    /// the first redirect URI is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed JSON or an empty redirect URI list.
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        let descriptor: ClientDescriptor =
            serde_json::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
        let client = descriptor
            .web
            .or(descriptor.installed)
            .ok_or_else(|| Error::Config("missing \"web\" client section".into()))?;
        let redirect_uri = client
            .redirect_uris
            .into_iter()
            .next()
            .ok_or_else(|| Error::Config("redirect_uris is empty".into()))?;

        Ok(Self {
            client_id: client.client_id,
            client_secret: Secret::new(client.client_secret),
            redirect_uri,
            auth_uri: client.auth_uri,
            token_uri: client.token_uri,
        })
    }
}

#[derive(Deserialize)]
struct ClientDescriptor {
    web: Option<ClientSection>,
    installed: Option<ClientSection>,
}

#[derive(Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<Url>,
    #[serde(default)]
    auth_uri: Option<Url>,
    #[serde(default)]
    token_uri: Option<Url>,
}

fn required(name: &str) -> Result<String, Error> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("{name} is required")))
}
