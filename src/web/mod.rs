//! HTTP surface: login callbacks, the publish form and video uploads.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crosspost::web::{Providers, ServerConfig, app};
//!
//! let config = ServerConfig::from_env()?;
//! let providers = Providers::from_credentials(&credentials, http);
//! let sessions = Arc::new(MemorySessionStore::new(config.session_ttl()));
//! let router = app(&config, providers, sessions);
//! ```

mod config;
mod cookies;
mod error;
mod extractor;
mod pages;
mod routes;
mod state;

use std::sync::Arc;

use axum::Router;

pub use config::ServerConfig;
pub use error::AppError;
pub use state::Providers;

use crate::session::SessionStore;

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;

/// Build the application router with every route and the session layer.
#[must_use]
pub fn app(config: &ServerConfig, providers: Providers, sessions: Arc<dyn SessionStore>) -> Router {
    let state = state::AppState::new(config.settings.clone(), providers, sessions);
    routes::router(state)
}
