use crate::entities::Profile;
use crate::identity::GatewaySession;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A signed-in operator as seen by this backend. `profile` is filled once
/// the role check has passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub identity_id: Uuid,
    pub email: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub profile: Option<Profile>,
}

impl Session {
    pub fn from_gateway(granted: GatewaySession) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity_id: granted.user.id,
            email: granted.user.email,
            access_token: granted.access_token,
            refresh_token: granted.refresh_token,
            expires_at: Utc::now() + chrono::Duration::seconds(granted.expires_in as i64),
            profile: None,
        }
    }

    /// Time left on the gateway token, capped by `ttl`.
    pub fn ttl(&self, ttl: Duration) -> Duration {
        let remaining = (self.expires_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        remaining.min(ttl)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt session record: {0}")]
    Corrupt(String),
}

impl From<redis::RedisError> for SessionStoreError {
    fn from(e: redis::RedisError) -> Self {
        SessionStoreError::Unavailable(e.to_string())
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, session: &Session, ttl: Duration) -> Result<(), SessionStoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<Session>, SessionStoreError>;
    async fn remove(&self, id: Uuid) -> Result<(), SessionStoreError>;
}

pub struct RedisSessionStore {
    client: redis::Client,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn key(id: Uuid) -> String {
        format!("aidboard:session:{id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, session: &Session, ttl: Duration) -> Result<(), SessionStoreError> {
        let payload =
            serde_json::to_string(session).map_err(|e| SessionStoreError::Corrupt(e.to_string()))?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(Self::key(session.id), payload, ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Session>, SessionStoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(Self::key(id)).await?;
        payload
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| SessionStoreError::Corrupt(e.to_string()))
            })
            .transpose()
    }

    async fn remove(&self, id: Uuid) -> Result<(), SessionStoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(Self::key(id)).await?;
        Ok(())
    }
}

/// Process-local sessions for tests and single-instance deployments.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, (Session, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|(_, expires)| *expires > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    /// Expired entries are dropped on every write.
    async fn put(&self, session: &Session, ttl: Duration) -> Result<(), SessionStoreError> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, (_, expires)| *expires > now);
        sessions.insert(session.id, (session.clone(), now + ttl));
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Session>, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            Some((session, expires)) if *expires > Instant::now() => Ok(Some(session.clone())),
            Some(_) => {
                sessions.remove(&id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, id: Uuid) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }
}
