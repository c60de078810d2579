use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use super::cookies;
use super::error::AppError;
use super::state::AppState;
use crate::error::Error;
use crate::session::Session;
use crate::types::{Identity, SessionId};

/// Resolve the session cookie to a live session, creating one when the
/// cookie is missing, unknown or expired. The session is handed to handlers
/// through request extensions.
pub(super) async fn session_layer(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let existing = match jar.get(&state.settings.session_cookie_name) {
        Some(cookie) => {
            let id = SessionId(cookie.value().to_string());
            state.sessions.find(&id).await?
        }
        None => None,
    };

    let (session, new_cookie) = match existing {
        Some(session) => (session, None),
        None => {
            let session = state.sessions.create().await?;
            tracing::debug!(session_id = %session.id, "Created session");
            let cookie = cookies::session_cookie(
                &state.settings.session_cookie_name,
                session.id.as_str(),
                state.settings.session_ttl,
                state.settings.secure_cookies,
            );
            (session, Some(cookie))
        }
    };

    request.extensions_mut().insert(session);
    let response = next.run(request).await;

    if response.extensions().get::<SessionEnded>().is_some() {
        return Ok(response);
    }

    Ok(match new_cookie {
        Some(cookie) => (jar.add(cookie), response).into_response(),
        None => response,
    })
}

/// Response marker set by handlers that end the session. The layer then
/// issues no cookie for a session it created during the same request.
#[derive(Clone, Copy)]
pub(super) struct SessionEnded;

/// The request's session, authenticated or not.
pub(super) struct CurrentSession(pub(super) Session);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self)
            .ok_or_else(|| AppError::Store("session layer is not installed".into()))
    }
}

/// A session with a login identity. Anonymous requests are redirected home.
pub(super) struct LoggedIn {
    pub(super) session: Session,
    pub(super) identity: Identity,
}

impl FromRequestParts<AppState> for LoggedIn {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;
        let identity = session.identity.clone().ok_or(Error::NotAuthenticated)?;
        Ok(Self { session, identity })
    }
}

/// A session holding a YouTube grant. Others are sent to `/auth/youtube`.
pub(super) struct UploadAuthorized(pub(super) Session);

impl FromRequestParts<AppState> for UploadAuthorized {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        if session.upload_grant.is_none() {
            return Err(Redirect::to("/auth/youtube").into_response());
        }
        Ok(Self(session))
    }
}
