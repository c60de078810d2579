use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::session::Session;
use crate::social::{FacebookPages, TweetPublisher};
use crate::types::{Provider, PublishedId};

/// Per-provider outcome of one publish request.
#[derive(Debug)]
pub struct PublishReport {
    /// Page the post went to.
    pub page_id: String,
    pub facebook: Result<PublishedId, Error>,
    pub twitter: Result<PublishedId, Error>,
}

impl PublishReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.facebook.is_ok() && self.twitter.is_ok()
    }

    fn outcomes(&self) -> [(Provider, &Result<PublishedId, Error>); 2] {
        [
            (Provider::Facebook, &self.facebook),
            (Provider::Twitter, &self.twitter),
        ]
    }
}

impl fmt::Display for PublishReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            return f.write_str("Successfully posted on Facebook and Twitter");
        }
        let lines = self
            .outcomes()
            .into_iter()
            .map(|(provider, outcome)| match outcome {
                Ok(id) => format!("{provider}: posted ({id})"),
                Err(e) => format!("{provider}: failed ({e})"),
            })
            .collect::<Vec<_>>();
        write!(f, "Failed to post on social media.\n{}", lines.join("\n"))
    }
}

/// Sends one piece of content to the user's Facebook page and to Twitter.
pub struct PublishOrchestrator {
    facebook: Arc<dyn FacebookPages>,
    twitter: Arc<dyn TweetPublisher>,
}

impl PublishOrchestrator {
    #[must_use]
    pub fn new(facebook: Arc<dyn FacebookPages>, twitter: Arc<dyn TweetPublisher>) -> Self {
        Self { facebook, twitter }
    }

    /// Publish `content` verbatim.
    ///
    /// The first page in the user's listing is the Facebook target. Without a
    /// target nothing is published anywhere. With one, both providers are
    /// attempted and each outcome is reported.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAuthenticated`] if the session has no Facebook identity
    /// - [`Error::NoPublishTarget`] if the user manages no pages
    /// - [`Error::FacebookPublish`] / [`Error::Timeout`] if the page listing fails
    pub async fn publish(&self, session: &Session, content: &str) -> Result<PublishReport, Error> {
        let identity = session
            .identity
            .as_ref()
            .filter(|i| i.provider == Provider::Facebook)
            .ok_or(Error::NotAuthenticated)?;

        let page = self
            .facebook
            .list_pages(&identity.access_token)
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NoPublishTarget)?;

        tracing::debug!(session_id = %session.id, page_id = %page.id, "Resolved Facebook page");

        let facebook = self.facebook.post_to_feed(&page, content).await;
        match &facebook {
            Ok(id) => tracing::info!(post_id = %id, page_id = %page.id, "Posted to Facebook page"),
            Err(e) => tracing::warn!(error = %e, page_id = %page.id, "Facebook post failed"),
        }

        let twitter = self.twitter.tweet(content).await;
        match &twitter {
            Ok(id) => tracing::info!(tweet_id = %id, "Posted to Twitter"),
            Err(e) => tracing::warn!(error = %e, "Twitter post failed"),
        }

        Ok(PublishReport {
            page_id: page.id,
            facebook,
            twitter,
        })
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::types::{FacebookPage, Secret};

    /// Records every call; configurable page listing and failures.
    #[derive(Default)]
    pub(crate) struct FakeFacebook {
        pub pages: Vec<FacebookPage>,
        pub fail_listing: bool,
        pub fail_post: bool,
        pub listed_with: Mutex<Vec<String>>,
        pub posts: Mutex<Vec<(String, String)>>,
    }

    impl FakeFacebook {
        pub(crate) fn with_page(id: &str) -> Self {
            Self {
                pages: vec![FacebookPage {
                    id: id.into(),
                    name: Some(format!("Page {id}")),
                    access_token: Secret::new(format!("{id}-token")),
                }],
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl FacebookPages for FakeFacebook {
        async fn list_pages(&self, user_token: &Secret) -> Result<Vec<FacebookPage>, Error> {
            self.listed_with
                .lock()
                .unwrap()
                .push(user_token.expose().to_string());
            if self.fail_listing {
                return Err(Error::provider(Provider::Facebook, "page listing", Some(500), "down"));
            }
            Ok(self.pages.clone())
        }

        async fn post_to_feed(
            &self,
            page: &FacebookPage,
            message: &str,
        ) -> Result<PublishedId, Error> {
            self.posts
                .lock()
                .unwrap()
                .push((page.id.clone(), message.to_string()));
            if self.fail_post {
                return Err(Error::provider(Provider::Facebook, "feed post", Some(400), "rejected"));
            }
            Ok(PublishedId(format!("{}_1", page.id)))
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeTwitter {
        pub fail: bool,
        pub tweets: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TweetPublisher for FakeTwitter {
        async fn tweet(&self, text: &str) -> Result<PublishedId, Error> {
            self.tweets.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(Error::provider(Provider::Twitter, "tweet", Some(403), "duplicate"));
            }
            Ok(PublishedId("tweet-1".into()))
        }
    }
}
