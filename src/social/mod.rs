//! Publishing clients for the external platforms.
//!
//! The orchestrators only see the traits below; the concrete clients talk to
//! the Graph API, the Twitter v2 API and the YouTube Data API.

mod facebook;
mod twitter;
mod youtube;

use std::path::Path;

use async_trait::async_trait;

pub use facebook::GraphClient;
pub use twitter::TwitterClient;
pub use youtube::YouTubeClient;

use crate::error::Error;
use crate::types::{FacebookPage, PublishedId, Secret, VideoMetadata};

#[async_trait]
pub trait FacebookPages: Send + Sync + 'static {
    /// Pages the user manages, each with its page-scoped access token.
    async fn list_pages(&self, user_token: &Secret) -> Result<Vec<FacebookPage>, Error>;

    /// Publish `message` verbatim to the page's feed.
    async fn post_to_feed(&self, page: &FacebookPage, message: &str)
    -> Result<PublishedId, Error>;
}

#[async_trait]
pub trait TweetPublisher: Send + Sync + 'static {
    /// Publish `text` verbatim as a tweet from the application account.
    async fn tweet(&self, text: &str) -> Result<PublishedId, Error>;
}

#[async_trait]
pub trait VideoUploader: Send + Sync + 'static {
    /// Insert one video, reading the media body from `file`.
    async fn insert_video(
        &self,
        access_token: &Secret,
        file: &Path,
        content_type: &str,
        metadata: &VideoMetadata,
    ) -> Result<PublishedId, Error>;
}
