use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use ulid::Ulid;

use crate::error::Error;

/// Opaque, server-generated session token carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a fresh session identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// External platform the server talks to.
///
/// Only `Facebook` and `Google` issue user identities; `Twitter` is reached
/// with the application's own credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Provider {
    Facebook,
    #[display("YouTube")]
    Google,
    Twitter,
}

/// Provider-issued secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, From)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Profile fields returned by Facebook at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A successful OAuth login with exactly one provider.
///
/// Lives only inside its session; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub provider: Provider,
    pub profile: Option<Profile>,
    pub access_token: Secret,
    pub refresh_token: Option<Secret>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

impl Identity {
    #[must_use]
    pub fn new(provider: Provider, access_token: Secret) -> Self {
        Self {
            provider,
            profile: None,
            access_token,
            refresh_token: None,
            expires_at: None,
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    #[must_use]
    pub fn with_refresh_token(mut self, token: Option<Secret>) -> Self {
        self.refresh_token = token;
        self
    }

    /// Set the expiry from a provider's `expires_in` seconds.
    #[must_use]
    pub fn expiring_in(mut self, expires_in: Option<u64>) -> Self {
        self.expires_at = expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| OffsetDateTime::now_utc() + time::Duration::seconds(secs));
        self
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.display_name.as_str())
    }

    /// True when the provider-declared lifetime has passed.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// A Facebook page the user can post to, with its page-scoped token.
#[derive(Debug, Clone, Deserialize)]
pub struct FacebookPage {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub access_token: Secret,
}

/// Identifier of a post, tweet or video created on a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct PublishedId(pub String);

/// YouTube visibility of an uploaded video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    #[default]
    #[display("private")]
    Private,
    #[display("unlisted")]
    Unlisted,
    #[display("public")]
    Public,
}

impl std::str::FromStr for PrivacyStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "private" => Ok(Self::Private),
            "unlisted" => Ok(Self::Unlisted),
            "public" => Ok(Self::Public),
            other => Err(Error::InvalidUpload(format!(
                "privacyStatus must be private, unlisted or public, got {other:?}"
            ))),
        }
    }
}

/// "People & Blogs", YouTube's default category.
pub const DEFAULT_CATEGORY_ID: u32 = 22;

/// Metadata sent with a video insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub category_id: u32,
    pub privacy_status: PrivacyStatus,
    pub language: Option<String>,
}

impl VideoMetadata {
    /// Create metadata with the required title; other fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUpload`] if the title is blank.
    pub fn new(title: impl Into<String>) -> Result<Self, Error> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(Error::InvalidUpload("title is required".into()));
        }
        Ok(Self {
            title,
            description: String::new(),
            category_id: DEFAULT_CATEGORY_ID,
            privacy_status: PrivacyStatus::default(),
            language: None,
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_category_id(mut self, category_id: u32) -> Self {
        self.category_id = category_id;
        self
    }

    #[must_use]
    pub fn with_privacy_status(mut self, status: PrivacyStatus) -> Self {
        self.privacy_status = status;
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.trim().is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret::new("EAAB-very-secret");
        assert_eq!(format!("{secret:?}"), "Secret(***)");
        assert_eq!(secret.expose(), "EAAB-very-secret");

        let identity = Identity::new(Provider::Facebook, secret);
        assert!(!format!("{identity:?}").contains("very-secret"));
    }

    #[test]
    fn provider_display() {
        assert_eq!(Provider::Facebook.to_string(), "Facebook");
        assert_eq!(Provider::Google.to_string(), "YouTube");
        assert_eq!(Provider::Twitter.to_string(), "Twitter");
    }

    #[test]
    fn privacy_status_parses_known_values() {
        assert_eq!("private".parse::<PrivacyStatus>().unwrap(), PrivacyStatus::Private);
        assert_eq!("unlisted".parse::<PrivacyStatus>().unwrap(), PrivacyStatus::Unlisted);
        assert_eq!("public".parse::<PrivacyStatus>().unwrap(), PrivacyStatus::Public);
        assert!("secret".parse::<PrivacyStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&PrivacyStatus::Unlisted).unwrap(),
            "\"unlisted\""
        );
    }

    #[test]
    fn metadata_requires_title() {
        assert!(matches!(VideoMetadata::new("  "), Err(Error::InvalidUpload(_))));

        let meta = VideoMetadata::new("clip").unwrap();
        assert_eq!(meta.category_id, DEFAULT_CATEGORY_ID);
        assert_eq!(meta.privacy_status, PrivacyStatus::Private);
        assert!(meta.description.is_empty());
    }

    #[test]
    fn blank_language_is_dropped() {
        let meta = VideoMetadata::new("clip")
            .unwrap()
            .with_language(Some(" ".into()));
        assert_eq!(meta.language, None);
    }

    #[test]
    fn identity_expiry() {
        let now = OffsetDateTime::now_utc();
        let identity = Identity::new(Provider::Google, Secret::new("t")).expiring_in(Some(3600));
        assert!(!identity.is_expired(now));
        assert!(identity.is_expired(now + time::Duration::hours(2)));

        let no_expiry = Identity::new(Provider::Google, Secret::new("t"));
        assert!(!no_expiry.is_expired(now));
    }
}
