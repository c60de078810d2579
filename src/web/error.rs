use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use crate::error::Error;

/// Errors surfaced by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] Error),

    /// Session store operation failed.
    #[error("Session store error: {0}")]
    Store(String),

    #[error("Upload form error: {0}")]
    Multipart(#[from] MultipartError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Core(e) => match e {
                Error::NotAuthenticated => StatusCode::SEE_OTHER,
                Error::AuthExchange { .. } => StatusCode::UNAUTHORIZED,
                Error::NoPublishTarget => StatusCode::UNPROCESSABLE_ENTITY,
                Error::FacebookPublish { .. }
                | Error::TwitterPublish { .. }
                | Error::YouTubeUpload { .. }
                | Error::Http(_) => StatusCode::BAD_GATEWAY,
                Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                Error::NoFileProvided | Error::InvalidUpload(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Multipart(e) => e.status(),
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Core(Error::NotAuthenticated)) {
            return Redirect::to("/").into_response();
        }

        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Internal error");
            return (status, "Internal error").into_response();
        }

        tracing::warn!(error = %self, status = status.as_u16(), "Request failed");
        (status, self.to_string()).into_response()
    }
}

impl From<crate::session::StoreError> for AppError {
    fn from(e: crate::session::StoreError) -> Self {
        Self::Store(e.to_string())
    }
}
