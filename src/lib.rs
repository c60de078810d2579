//! Cross-posting web server.
//!
//! Users log in with Facebook to publish one message to their first Facebook
//! page and to the app's Twitter account, and separately authorize YouTube
//! to upload videos. The [`web`] module wires the HTTP routes; everything it
//! calls out to sits behind the traits in [`oauth`] and [`social`].

pub mod credentials;
pub mod error;
pub mod http;
pub mod oauth;
pub mod pkce;
pub mod publish;
pub mod session;
pub mod social;
pub mod types;
pub mod upload;
pub mod web;

// Re-exports for convenient access
pub use credentials::Credentials;
pub use error::Error;
pub use oauth::{AuthProvider, AuthorizationRequest, FacebookAuth, GoogleAuth};
pub use publish::{PublishOrchestrator, PublishReport};
pub use session::{MemorySessionStore, Session, SessionStore};
pub use social::{FacebookPages, TweetPublisher, VideoUploader};
pub use types::{Identity, Provider, SessionId, VideoMetadata};
pub use upload::{StagedVideo, UploadOrchestrator, UploadedVideo};
pub use web::{Providers, ServerConfig, app};
