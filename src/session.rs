//! Server-side sessions keyed by the opaque token in the session cookie.

use std::collections::HashMap;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;

use crate::types::{Identity, SessionId};

/// Error type returned by session store implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Per-browser state.
///
/// `identity` is the login identity (Facebook) that gates the profile and
/// publish routes. `upload_grant` holds this session's own Google grant for
/// YouTube uploads, so no user's token is ever shared with another session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub identity: Option<Identity>,
    pub upload_grant: Option<Identity>,
    pub created_at: OffsetDateTime,
}

impl Session {
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            identity: None,
            upload_grant: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// True iff a login identity is attached.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Session persistence.
///
/// Expiry policy belongs to the store: an expired session is reported as
/// absent by [`find`](SessionStore::find).
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Create a new session with no identity.
    async fn create(&self) -> Result<Session, StoreError>;

    /// Look up a live session.
    async fn find(&self, id: &SessionId) -> Result<Option<Session>, StoreError>;

    /// Attach (or replace) the login identity.
    async fn attach_identity(
        &self,
        id: &SessionId,
        identity: Identity,
    ) -> Result<Session, StoreError>;

    /// Attach (or replace) the YouTube upload grant.
    async fn attach_upload_grant(
        &self,
        id: &SessionId,
        grant: Identity,
    ) -> Result<Session, StoreError>;

    /// Drop the session. Its token is unknown afterwards.
    async fn destroy(&self, id: &SessionId) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
#[error("session {0} not found")]
pub struct SessionNotFound(pub SessionId);

/// Process-local session store.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
    ttl: Duration,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// A TTL reaching past the representable date range never expires.
    fn is_live(&self, session: &Session, now: OffsetDateTime) -> bool {
        session
            .created_at
            .checked_add(self.ttl)
            .is_none_or(|end| end > now)
    }

    async fn update(
        &self,
        id: &SessionId,
        apply: impl FnOnce(&mut Session) + Send,
    ) -> Result<Session, StoreError> {
        let now = OffsetDateTime::now_utc();
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) if self.is_live(session, now) => {
                apply(session);
                Ok(session.clone())
            }
            Some(_) => {
                sessions.remove(id);
                Err(SessionNotFound(id.clone()).into())
            }
            None => Err(SessionNotFound(id.clone()).into()),
        }
    }

    /// Remove all expired sessions; returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| self.is_live(s, now));
        before - sessions.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self) -> Result<Session, StoreError> {
        let session = Session::new(SessionId::generate());
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn find(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        let now = OffsetDateTime::now_utc();
        let found = self.sessions.read().await.get(id).cloned();
        match found {
            Some(session) if self.is_live(&session, now) => Ok(Some(session)),
            Some(_) => {
                self.sessions.write().await.remove(id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn attach_identity(
        &self,
        id: &SessionId,
        identity: Identity,
    ) -> Result<Session, StoreError> {
        self.update(id, |s| s.identity = Some(identity)).await
    }

    async fn attach_upload_grant(
        &self,
        id: &SessionId,
        grant: Identity,
    ) -> Result<Session, StoreError> {
        self.update(id, |s| s.upload_grant = Some(grant)).await
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), StoreError> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}
