use std::path::Path;
use std::sync::Arc;

use tempfile::TempPath;
use time::OffsetDateTime;

use crate::error::Error;
use crate::oauth::AuthProvider;
use crate::session::Session;
use crate::social::VideoUploader;
use crate::types::{Provider, PublishedId, VideoMetadata};

/// A received video waiting in temporary storage.
///
/// The file is owned by this value: it is deleted when the upload finishes
/// and, failing that, when the value is dropped.
pub struct StagedVideo {
    path: TempPath,
    content_type: String,
}

impl StagedVideo {
    #[must_use]
    pub fn new(path: TempPath, content_type: impl Into<String>) -> Self {
        Self {
            path,
            content_type: content_type.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    fn discard(self) {
        let path = self.path.to_path_buf();
        if let Err(e) = self.path.close() {
            tracing::warn!(error = %e, path = %path.display(), "Failed to remove staged video");
        }
    }
}

#[derive(Debug)]
pub struct UploadedVideo {
    pub id: PublishedId,
}

impl UploadedVideo {
    #[must_use]
    pub fn watch_url(&self) -> String {
        format!("https://youtu.be/{}", self.id)
    }
}

/// Uploads one staged video with the session's own Google grant.
pub struct UploadOrchestrator {
    uploader: Arc<dyn VideoUploader>,
    google: Arc<dyn AuthProvider>,
}

impl UploadOrchestrator {
    #[must_use]
    pub fn new(uploader: Arc<dyn VideoUploader>, google: Arc<dyn AuthProvider>) -> Self {
        Self { uploader, google }
    }

    /// Upload `video` to YouTube. The staged file is removed on every path.
    ///
    /// An expired grant is refreshed first and written back to
    /// `session.upload_grant`, whether or not the insert then succeeds.
    /// Callers should persist the session's grant when it changed.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAuthenticated`] if the session holds no Google grant
    /// - [`Error::AuthExchange`] if an expired grant cannot be refreshed
    /// - [`Error::YouTubeUpload`] / [`Error::Timeout`] if the insert fails
    pub async fn upload_video(
        &self,
        session: &mut Session,
        video: StagedVideo,
        metadata: &VideoMetadata,
    ) -> Result<UploadedVideo, Error> {
        let result = self.insert(session, &video, metadata).await;
        video.discard();
        result
    }

    async fn insert(
        &self,
        session: &mut Session,
        video: &StagedVideo,
        metadata: &VideoMetadata,
    ) -> Result<UploadedVideo, Error> {
        let grant = session
            .upload_grant
            .as_ref()
            .filter(|g| g.provider == Provider::Google)
            .ok_or(Error::NotAuthenticated)?;

        let token = if grant.is_expired(OffsetDateTime::now_utc()) {
            tracing::debug!(session_id = %session.id, "Refreshing expired YouTube grant");
            let refreshed = self.google.refresh(grant).await?;
            let token = refreshed.access_token.clone();
            session.upload_grant = Some(refreshed);
            token
        } else {
            grant.access_token.clone()
        };

        let id = self
            .uploader
            .insert_video(&token, video.path(), video.content_type(), metadata)
            .await?;

        tracing::info!(session_id = %session.id, video_id = %id, "Uploaded video to YouTube");
        Ok(UploadedVideo { id })
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::types::Secret;

    /// Records each insert; the staged file must still exist during the call.
    #[derive(Default)]
    pub(crate) struct FakeUploader {
        pub fail: bool,
        pub calls: Mutex<Vec<(String, PathBuf, VideoMetadata)>>,
    }

    #[async_trait]
    impl VideoUploader for FakeUploader {
        async fn insert_video(
            &self,
            access_token: &Secret,
            file: &Path,
            _content_type: &str,
            metadata: &VideoMetadata,
        ) -> Result<PublishedId, Error> {
            assert!(file.exists(), "file must exist while uploading");
            self.calls.lock().unwrap().push((
                access_token.expose().to_string(),
                file.to_path_buf(),
                metadata.clone(),
            ));
            if self.fail {
                return Err(Error::provider(Provider::Google, "video insert", Some(500), "backend"));
            }
            Ok(PublishedId("vid123".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use async_trait::async_trait;

    use super::fakes::FakeUploader;
    use super::*;
    use crate::oauth::AuthorizationRequest;
    use crate::pkce::LoginChallenge;
    use crate::types::{Identity, Secret, SessionId};

    struct FakeGoogle;

    #[async_trait]
    impl AuthProvider for FakeGoogle {
        fn provider(&self) -> Provider {
            Provider::Google
        }

        fn authorization_url(&self) -> AuthorizationRequest {
            AuthorizationRequest {
                url: "https://accounts.example/auth".into(),
                challenge: LoginChallenge::generate(),
            }
        }

        async fn exchange_code(&self, _code: &str, _verifier: &str) -> Result<Identity, Error> {
            unreachable!("not used by uploads")
        }

        async fn refresh(&self, identity: &Identity) -> Result<Identity, Error> {
            Ok(Identity::new(Provider::Google, Secret::new("fresh-token"))
                .with_refresh_token(identity.refresh_token.clone())
                .expiring_in(Some(3600)))
        }
    }

    fn staged() -> (StagedVideo, PathBuf) {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"video").unwrap();
        let path = file.path().to_path_buf();
        (StagedVideo::new(file.into_temp_path(), "video/mp4"), path)
    }

    fn session_with_grant(grant: Option<Identity>) -> Session {
        let mut session = Session::new(SessionId::generate());
        session.upload_grant = grant;
        session
    }

    fn orchestrator(uploader: FakeUploader) -> (UploadOrchestrator, Arc<FakeUploader>) {
        let uploader = Arc::new(uploader);
        (
            UploadOrchestrator::new(uploader.clone(), Arc::new(FakeGoogle)),
            uploader,
        )
    }

    fn metadata() -> VideoMetadata {
        VideoMetadata::new("clip").unwrap()
    }

    #[tokio::test]
    async fn success_returns_id_and_removes_file() {
        let (orchestrator, uploader) = orchestrator(FakeUploader::default());
        let (video, path) = staged();
        let mut session =
            session_with_grant(Some(Identity::new(Provider::Google, Secret::new("ya29"))));

        let uploaded = orchestrator
            .upload_video(&mut session, video, &metadata())
            .await
            .unwrap();

        assert_eq!(uploaded.watch_url(), "https://youtu.be/vid123");
        assert_eq!(session.upload_grant.unwrap().access_token.expose(), "ya29");
        assert!(!path.exists());

        let calls = uploader.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "ya29");
        assert_eq!(calls[0].1, path);
        assert_eq!(calls[0].2.title, "clip");
    }

    #[tokio::test]
    async fn failure_still_removes_file() {
        let (orchestrator, _) = orchestrator(FakeUploader {
            fail: true,
            ..FakeUploader::default()
        });
        let (video, path) = staged();
        let mut session =
            session_with_grant(Some(Identity::new(Provider::Google, Secret::new("ya29"))));

        let err = orchestrator
            .upload_video(&mut session, video, &metadata())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::YouTubeUpload { .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn missing_grant_removes_file_without_calling_provider() {
        let (orchestrator, uploader) = orchestrator(FakeUploader::default());
        let (video, path) = staged();

        let err = orchestrator
            .upload_video(&mut session_with_grant(None), video, &metadata())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotAuthenticated));
        assert!(uploader.calls.lock().unwrap().is_empty());
        assert!(!path.exists());
    }

    fn expired_grant() -> Identity {
        let mut grant = Identity::new(Provider::Google, Secret::new("stale"))
            .with_refresh_token(Some(Secret::new("1//r")));
        grant.expires_at = Some(OffsetDateTime::now_utc() - time::Duration::minutes(1));
        grant
    }

    #[tokio::test]
    async fn expired_grant_is_refreshed_before_upload() {
        let (orchestrator, uploader) = orchestrator(FakeUploader::default());
        let (video, _) = staged();
        let mut session = session_with_grant(Some(expired_grant()));

        orchestrator
            .upload_video(&mut session, video, &metadata())
            .await
            .unwrap();

        assert_eq!(uploader.calls.lock().unwrap()[0].0, "fresh-token");
        let refreshed = session.upload_grant.unwrap();
        assert_eq!(refreshed.access_token.expose(), "fresh-token");
        assert_eq!(
            refreshed.refresh_token.as_ref().map(Secret::expose),
            Some("1//r")
        );
    }

    #[tokio::test]
    async fn refreshed_grant_is_kept_when_insert_fails() {
        let (orchestrator, _) = orchestrator(FakeUploader {
            fail: true,
            ..FakeUploader::default()
        });
        let (video, path) = staged();
        let mut session = session_with_grant(Some(expired_grant()));

        let err = orchestrator
            .upload_video(&mut session, video, &metadata())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::YouTubeUpload { .. }));
        assert_eq!(
            session.upload_grant.unwrap().access_token.expose(),
            "fresh-token"
        );
        assert!(!path.exists());
    }

    #[test]
    fn dropping_staged_video_removes_file() {
        let (video, path) = staged();
        assert!(path.exists());
        drop(video);
        assert!(!path.exists());
    }
}
