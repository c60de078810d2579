use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use super::config::Settings;
use crate::credentials::Credentials;
use crate::oauth::{AuthProvider, FacebookAuth, GoogleAuth};
use crate::publish::PublishOrchestrator;
use crate::session::SessionStore;
use crate::social::{
    FacebookPages, GraphClient, TweetPublisher, TwitterClient, VideoUploader, YouTubeClient,
};
use crate::upload::UploadOrchestrator;

/// External collaborators the server calls through.
pub struct Providers {
    pub facebook_auth: Arc<dyn AuthProvider>,
    pub google_auth: Arc<dyn AuthProvider>,
    pub facebook: Arc<dyn FacebookPages>,
    pub twitter: Arc<dyn TweetPublisher>,
    pub youtube: Arc<dyn VideoUploader>,
}

impl Providers {
    /// Real provider clients sharing one outbound HTTP client.
    #[must_use]
    pub fn from_credentials(credentials: &Credentials, http: reqwest::Client) -> Self {
        Self {
            facebook_auth: Arc::new(FacebookAuth::new(&credentials.facebook, http.clone())),
            google_auth: Arc::new(GoogleAuth::new(&credentials.google, http.clone())),
            facebook: Arc::new(GraphClient::new(http.clone())),
            twitter: Arc::new(TwitterClient::new(credentials.twitter.clone(), http.clone())),
            youtube: Arc::new(YouTubeClient::new(http)),
        }
    }
}

/// Shared state for route handlers.
#[derive(Clone)]
pub(super) struct AppState {
    pub(super) sessions: Arc<dyn SessionStore>,
    pub(super) facebook_auth: Arc<dyn AuthProvider>,
    pub(super) google_auth: Arc<dyn AuthProvider>,
    pub(super) publisher: Arc<PublishOrchestrator>,
    pub(super) uploader: Arc<UploadOrchestrator>,
    pub(super) settings: Settings,
}

impl AppState {
    pub(super) fn new(
        settings: Settings,
        providers: Providers,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let Providers {
            facebook_auth,
            google_auth,
            facebook,
            twitter,
            youtube,
        } = providers;

        Self {
            sessions,
            publisher: Arc::new(PublishOrchestrator::new(facebook, twitter)),
            uploader: Arc::new(UploadOrchestrator::new(youtube, google_auth.clone())),
            facebook_auth,
            google_auth,
            settings,
        }
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.settings.cookie_key.clone()
    }
}
