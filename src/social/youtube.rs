use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use url::Url;

use super::VideoUploader;
use crate::error::Error;
use crate::http;
use crate::types::{PrivacyStatus, Provider, PublishedId, Secret, VideoMetadata};

const DEFAULT_UPLOAD_URL: &str = "https://www.googleapis.com/upload/";

/// YouTube Data API v3 client using the resumable upload protocol:
/// one metadata request opens an upload session, one `PUT` sends the media.
pub struct YouTubeClient {
    upload_url: Url,
    http: reqwest::Client,
}

impl YouTubeClient {
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            upload_url: DEFAULT_UPLOAD_URL.parse().expect("valid default URL"),
            http,
        }
    }

    #[must_use]
    pub fn with_upload_url(mut self, url: Url) -> Self {
        self.upload_url = url;
        self
    }

    async fn open_session(
        &self,
        access_token: &Secret,
        content_type: &str,
        length: u64,
        metadata: &VideoMetadata,
    ) -> Result<Url, Error> {
        let mut url = http::endpoint(&self.upload_url, "youtube/v3/videos")?;
        url.query_pairs_mut()
            .append_pair("uploadType", "resumable")
            .append_pair("part", "snippet,status");

        let request = self
            .http
            .post(url)
            .bearer_auth(access_token.expose())
            .header("X-Upload-Content-Type", content_type)
            .header("X-Upload-Content-Length", length)
            .json(&VideoResource::from(metadata));
        let response = http::send(request, Provider::Google, "upload session").await?;

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| {
                Error::provider(
                    Provider::Google,
                    "upload session",
                    Some(response.status().as_u16()),
                    "response carried no upload location",
                )
            })
    }
}

#[async_trait]
impl VideoUploader for YouTubeClient {
    async fn insert_video(
        &self,
        access_token: &Secret,
        file: &Path,
        content_type: &str,
        metadata: &VideoMetadata,
    ) -> Result<PublishedId, Error> {
        let media = tokio::fs::File::open(file).await?;
        let length = media.metadata().await?.len();

        let session = self
            .open_session(access_token, content_type, length, metadata)
            .await?;

        let request = self
            .http
            .put(session)
            .bearer_auth(access_token.expose())
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, length)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(media)));
        let response = http::send(request, Provider::Google, "video insert").await?;
        let video: InsertedVideo = http::json(response, Provider::Google, "video insert").await?;
        Ok(PublishedId(video.id))
    }
}

#[derive(Serialize)]
struct VideoResource<'a> {
    snippet: Snippet<'a>,
    status: Status,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Snippet<'a> {
    title: &'a str,
    description: &'a str,
    category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_audio_language: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    privacy_status: PrivacyStatus,
}

impl<'a> From<&'a VideoMetadata> for VideoResource<'a> {
    fn from(meta: &'a VideoMetadata) -> Self {
        let language = meta.language.as_deref();
        Self {
            snippet: Snippet {
                title: &meta.title,
                description: &meta.description,
                category_id: meta.category_id.to_string(),
                default_language: language,
                default_audio_language: language,
            },
            status: Status {
                privacy_status: meta.privacy_status,
            },
        }
    }
}

#[derive(Deserialize)]
struct InsertedVideo {
    id: String,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_bytes, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn metadata() -> VideoMetadata {
        VideoMetadata::new("test clip")
            .unwrap()
            .with_description("Video Description")
            .with_category_id(24)
            .with_language(Some("en".into()))
    }

    #[test]
    fn resource_uses_api_field_names() {
        let json = serde_json::to_value(VideoResource::from(&metadata())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "snippet": {
                    "title": "test clip",
                    "description": "Video Description",
                    "categoryId": "24",
                    "defaultLanguage": "en",
                    "defaultAudioLanguage": "en"
                },
                "status": {"privacyStatus": "private"}
            })
        );
    }

    #[test]
    fn resource_omits_unset_language() {
        let meta = VideoMetadata::new("x").unwrap();
        let json = serde_json::to_value(VideoResource::from(&meta)).unwrap();
        assert!(json["snippet"].get("defaultLanguage").is_none());
    }

    #[tokio::test]
    async fn uploads_through_resumable_session() {
        let server = MockServer::start().await;
        let session_url = format!("{}/upload/session/abc", server.uri());

        Mock::given(method("POST"))
            .and(path("/youtube/v3/videos"))
            .and(query_param("uploadType", "resumable"))
            .and(query_param("part", "snippet,status"))
            .and(header("authorization", "Bearer ya29.token"))
            .and(header("x-upload-content-type", "video/mp4"))
            .and(body_json(serde_json::to_value(VideoResource::from(&metadata())).unwrap()))
            .respond_with(ResponseTemplate::new(200).insert_header("Location", session_url.as_str()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/upload/session/abc"))
            .and(body_bytes(b"fake video bytes".to_vec()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "youtube#video",
                "id": "dQw4w9WgXcQ"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"fake video bytes").unwrap();

        let client = YouTubeClient::new(reqwest::Client::new())
            .with_upload_url(server.uri().parse().unwrap());
        let id = client
            .insert_video(&Secret::new("ya29.token"), file.path(), "video/mp4", &metadata())
            .await
            .unwrap();

        assert_eq!(id.to_string(), "dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn rejected_session_is_youtube_upload_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/youtube/v3/videos"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Credentials"))
            .mount(&server)
            .await;

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"bytes").unwrap();

        let client = YouTubeClient::new(reqwest::Client::new())
            .with_upload_url(server.uri().parse().unwrap());
        let err = client
            .insert_video(&Secret::new("expired"), file.path(), "video/mp4", &metadata())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::YouTubeUpload { operation: "upload session", status: Some(401), .. }
        ));
    }
}
