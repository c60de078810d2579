use crate::types::Provider;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The provider rejected the authorization code or the callback was invalid.
    #[error("{provider} authorization failed: {detail}")]
    AuthExchange { provider: Provider, detail: String },

    #[error("You do not have any Facebook pages to post to.")]
    NoPublishTarget,

    #[error("Facebook {operation} failed{}: {detail}", status_suffix(*.status))]
    FacebookPublish {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },

    #[error("Twitter {operation} failed{}: {detail}", status_suffix(*.status))]
    TwitterPublish {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },

    #[error("YouTube {operation} failed{}: {detail}", status_suffix(*.status))]
    YouTubeUpload {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },

    #[error("No video uploaded")]
    NoFileProvided,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("{provider} {operation} timed out")]
    Timeout {
        provider: Provider,
        operation: &'static str,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn status_suffix(status: Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl Error {
    /// Builds the provider-specific failure for a call against `provider`.
    pub(crate) fn provider(
        provider: Provider,
        operation: &'static str,
        status: Option<u16>,
        detail: impl Into<String>,
    ) -> Self {
        let detail = detail.into();
        match provider {
            Provider::Facebook => Self::FacebookPublish {
                operation,
                status,
                detail,
            },
            Provider::Twitter => Self::TwitterPublish {
                operation,
                status,
                detail,
            },
            Provider::Google => Self::YouTubeUpload {
                operation,
                status,
                detail,
            },
        }
    }

    /// Converts a transport error into the failure kind of `provider`.
    ///
    /// Timeouts become [`Error::Timeout`] so the web layer can tell a hung
    /// provider apart from one that answered with an error.
    pub(crate) fn transport(
        provider: Provider,
        operation: &'static str,
        err: reqwest::Error,
    ) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                provider,
                operation,
            };
        }
        Self::provider(
            provider,
            operation,
            err.status().map(|s| s.as_u16()),
            err.to_string(),
        )
    }

    /// Which provider the failure came from, if any.
    #[must_use]
    pub fn provider_kind(&self) -> Option<Provider> {
        match self {
            Self::AuthExchange { provider, .. } | Self::Timeout { provider, .. } => {
                Some(*provider)
            }
            Self::FacebookPublish { .. } | Self::NoPublishTarget => Some(Provider::Facebook),
            Self::TwitterPublish { .. } => Some(Provider::Twitter),
            Self::YouTubeUpload { .. } => Some(Provider::Google),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_name_operation_and_status() {
        let err = Error::provider(Provider::Facebook, "feed post", Some(400), "bad request");
        assert_eq!(
            err.to_string(),
            "Facebook feed post failed (HTTP 400): bad request"
        );
        assert!(matches!(err, Error::FacebookPublish { .. }));
    }

    #[test]
    fn provider_errors_without_status() {
        let err = Error::provider(Provider::Twitter, "tweet", None, "connection reset");
        assert_eq!(err.to_string(), "Twitter tweet failed: connection reset");
        assert_eq!(err.provider_kind(), Some(Provider::Twitter));
    }

    #[test]
    fn google_failures_are_upload_errors() {
        let err = Error::provider(Provider::Google, "video insert", Some(403), "quota");
        assert!(matches!(err, Error::YouTubeUpload { status: Some(403), .. }));
    }
}
