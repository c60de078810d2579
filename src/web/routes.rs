use std::num::NonZeroU32;
use std::path::Path;

use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Router};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use super::cookies;
use super::error::AppError;
use super::extractor::{CurrentSession, LoggedIn, SessionEnded, UploadAuthorized, session_layer};
use super::pages;
use super::state::AppState;
use crate::error::Error;
use crate::oauth::AuthProvider;
use crate::types::{Identity, PrivacyStatus, Provider, VideoMetadata};
use crate::upload::StagedVideo;

pub(super) fn router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.settings.max_upload_bytes);

    Router::new()
        .route("/", get(home))
        .route("/auth/facebook", get(facebook_login))
        .route("/auth/facebook/callback", get(facebook_callback))
        .route("/profile", get(profile))
        .route("/post", get(post_form).post(publish))
        .route("/auth/youtube", get(youtube_login))
        .route("/auth/youtube/callback", get(youtube_callback))
        .route("/upload", get(upload_form))
        .route("/upload/youtube", post(upload_video).layer(upload_limit))
        .route("/logout", get(logout))
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        .with_state(state)
}

async fn home() -> Html<&'static str> {
    pages::home()
}

// ── Login ──────────────────────────────────────────────────────────

fn start_login(
    provider: &dyn AuthProvider,
    jar: PrivateCookieJar,
    secure: bool,
) -> (PrivateCookieJar, Redirect) {
    let auth_req = provider.authorization_url();
    let jar = cookies::remember_login(jar, provider.provider(), &auth_req.challenge, secure);
    (jar, Redirect::to(&auth_req.url))
}

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

fn rejected(provider: Provider, detail: &str) -> Error {
    Error::AuthExchange {
        provider,
        detail: detail.to_string(),
    }
}

/// Check the callback against the stored attempt and redeem its code.
async fn finish_login(
    provider: &dyn AuthProvider,
    jar: &PrivateCookieJar,
    params: CallbackParams,
) -> Result<Identity, Error> {
    let which = provider.provider();

    if let Some(error) = &params.error {
        let desc = params.error_description.as_deref().unwrap_or("Unknown error");
        tracing::warn!(provider = %which, error = %error, description = %desc, "Provider denied login");
        return Err(rejected(which, desc));
    }

    let code = params.code.ok_or_else(|| rejected(which, "missing_code"))?;
    let received_state = params.state.ok_or_else(|| rejected(which, "state_mismatch"))?;
    let stored_state =
        cookies::stored_state(jar, which).ok_or_else(|| rejected(which, "state_mismatch"))?;

    if received_state != stored_state {
        tracing::warn!(provider = %which, "OAuth state mismatch");
        return Err(rejected(which, "state_mismatch"));
    }

    let code_verifier =
        cookies::stored_verifier(jar, which).ok_or_else(|| rejected(which, "missing_verifier"))?;

    provider.exchange_code(&code, &code_verifier).await
}

async fn facebook_login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    start_login(state.facebook_auth.as_ref(), jar, state.settings.secure_cookies)
}

async fn facebook_callback(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Query(params): Query<CallbackParams>,
) -> (PrivateCookieJar, Result<Redirect, AppError>) {
    let result = finish_login(state.facebook_auth.as_ref(), &jar, params).await;
    let jar = cookies::forget_login(jar, Provider::Facebook);

    let outcome = async {
        let identity = result?;
        state.sessions.attach_identity(&session.id, identity).await?;
        tracing::info!(session_id = %session.id, "Facebook login successful");
        Ok::<_, AppError>(Redirect::to("/profile"))
    }
    .await;

    (jar, outcome)
}

async fn youtube_login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    start_login(state.google_auth.as_ref(), jar, state.settings.secure_cookies)
}

async fn youtube_callback(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Query(params): Query<CallbackParams>,
) -> (PrivateCookieJar, Result<&'static str, AppError>) {
    let result = finish_login(state.google_auth.as_ref(), &jar, params).await;
    let jar = cookies::forget_login(jar, Provider::Google);

    let outcome = async {
        let grant = result?;
        state.sessions.attach_upload_grant(&session.id, grant).await?;
        tracing::info!(session_id = %session.id, "YouTube authorization successful");
        Ok::<_, AppError>("YouTube authentication successful. You can now upload videos.")
    }
    .await;

    (jar, outcome)
}

// ── Publishing ─────────────────────────────────────────────────────

async fn profile(LoggedIn { identity, .. }: LoggedIn) -> Html<String> {
    pages::profile(identity.display_name().unwrap_or("there"))
}

async fn post_form(_: LoggedIn) -> Html<&'static str> {
    pages::post_form()
}

#[derive(Deserialize)]
struct PostForm {
    #[serde(default)]
    content: String,
}

async fn publish(
    State(state): State<AppState>,
    LoggedIn { session, .. }: LoggedIn,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let report = state.publisher.publish(&session, &form.content).await?;
    let status = if report.is_success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, report.to_string()).into_response())
}

// ── Upload ─────────────────────────────────────────────────────────

async fn upload_form() -> Html<&'static str> {
    pages::upload_form()
}

/// Fields of the upload form. Unknown fields are skipped.
#[derive(Default)]
struct UploadForm {
    video: Option<StagedVideo>,
    title: Option<String>,
    description: Option<String>,
    category_id: Option<String>,
    privacy_status: Option<String>,
    language: Option<String>,
}

impl UploadForm {
    async fn read(multipart: &mut Multipart, upload_dir: &Path) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(mut field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match name.as_str() {
                "video" if form.video.is_none() => {
                    form.video = stage(&mut field, upload_dir).await?;
                }
                "title" => form.title = Some(field.text().await?),
                "description" => form.description = Some(field.text().await?),
                "categoryId" => form.category_id = Some(field.text().await?),
                "privacyStatus" => form.privacy_status = Some(field.text().await?),
                "language" => form.language = Some(field.text().await?),
                _ => {}
            }
        }
        Ok(form)
    }

    fn metadata(&self) -> Result<VideoMetadata, Error> {
        let privacy_status = match non_blank(self.privacy_status.as_deref()) {
            Some(raw) => raw.parse::<PrivacyStatus>()?,
            None => PrivacyStatus::default(),
        };

        let mut metadata = VideoMetadata::new(self.title.clone().unwrap_or_default())?
            .with_description(self.description.clone().unwrap_or_default())
            .with_privacy_status(privacy_status)
            .with_language(self.language.clone());

        if let Some(raw) = non_blank(self.category_id.as_deref()) {
            let id = raw.parse::<NonZeroU32>().map_err(|_| {
                Error::InvalidUpload(format!("categoryId must be a positive integer, got {raw:?}"))
            })?;
            metadata = metadata.with_category_id(id.get());
        }
        Ok(metadata)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Stream one file field to a temporary file. An empty field counts as no file.
async fn stage(field: &mut Field<'_>, upload_dir: &Path) -> Result<Option<StagedVideo>, AppError> {
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(Error::from)?;
    let (file, path) = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(upload_dir)
        .map_err(Error::from)?
        .into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut written = 0usize;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await.map_err(Error::from)?;
        written += chunk.len();
    }
    file.flush().await.map_err(Error::from)?;

    if written == 0 {
        return Ok(None);
    }
    tracing::debug!(bytes = written, path = %path.display(), "Staged uploaded video");
    Ok(Some(StagedVideo::new(path, content_type)))
}

async fn upload_video(
    State(state): State<AppState>,
    UploadAuthorized(mut session): UploadAuthorized,
    mut multipart: Multipart,
) -> Result<String, AppError> {
    let mut form = UploadForm::read(&mut multipart, &state.settings.upload_dir).await?;
    let video = form.video.take().ok_or(Error::NoFileProvided)?;
    let metadata = form.metadata()?;

    let used_token = session.upload_grant.as_ref().map(|g| g.access_token.clone());
    let result = state
        .uploader
        .upload_video(&mut session, video, &metadata)
        .await;

    // Persist a grant refreshed during the upload, even if the insert failed.
    let refreshed = session
        .upload_grant
        .clone()
        .filter(|g| used_token.as_ref() != Some(&g.access_token));
    if let Some(grant) = refreshed {
        if let Err(e) = state.sessions.attach_upload_grant(&session.id, grant).await {
            tracing::warn!(error = %e, session_id = %session.id, "Failed to store refreshed YouTube grant");
        }
    }

    let uploaded = result?;
    Ok(format!("Video successfully uploaded: {}", uploaded.watch_url()))
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
) -> (Extension<SessionEnded>, PrivateCookieJar, Redirect) {
    if let Err(e) = state.sessions.destroy(&session.id).await {
        tracing::warn!(error = %e, "Session deletion failed during logout");
    }

    let clear_cookie = cookies::clear_session_cookie(&state.settings.session_cookie_name);
    (Extension(SessionEnded), jar.remove(clear_cookie), Redirect::to("/"))
}
