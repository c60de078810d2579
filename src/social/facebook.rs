use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::FacebookPages;
use crate::error::Error;
use crate::http;
use crate::types::{FacebookPage, Provider, PublishedId, Secret};

const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com/v19.0/";

/// Graph API client for page listing and feed posts.
pub struct GraphClient {
    graph_url: Url,
    http: reqwest::Client,
}

impl GraphClient {
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            graph_url: DEFAULT_GRAPH_URL.parse().expect("valid default URL"),
            http,
        }
    }

    /// Override the Graph API base URL.
    #[must_use]
    pub fn with_graph_url(mut self, url: Url) -> Self {
        self.graph_url = url;
        self
    }
}

#[derive(Deserialize)]
struct PageListing {
    #[serde(default)]
    data: Vec<FacebookPage>,
}

#[derive(Deserialize)]
struct CreatedObject {
    id: String,
}

#[async_trait]
impl FacebookPages for GraphClient {
    async fn list_pages(&self, user_token: &Secret) -> Result<Vec<FacebookPage>, Error> {
        let url = http::endpoint(&self.graph_url, "me/accounts")?;
        let request = self
            .http
            .get(url)
            .query(&[("access_token", user_token.expose())]);
        let response = http::send(request, Provider::Facebook, "page listing").await?;
        let listing: PageListing = http::json(response, Provider::Facebook, "page listing").await?;
        Ok(listing.data)
    }

    async fn post_to_feed(
        &self,
        page: &FacebookPage,
        message: &str,
    ) -> Result<PublishedId, Error> {
        let url = http::endpoint(&self.graph_url, &format!("{}/feed", page.id))?;
        let request = self.http.post(url).form(&[
            ("message", message),
            ("access_token", page.access_token.expose()),
        ]);
        let response = http::send(request, Provider::Facebook, "feed post").await?;
        let created: CreatedObject = http::json(response, Provider::Facebook, "feed post").await?;
        Ok(PublishedId(created.id))
    }
}
