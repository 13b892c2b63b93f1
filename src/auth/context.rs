use super::roles::resolve_role;
use super::sessions::{Session, SessionStore, SessionStoreError};
use super::LoginError;
use crate::entities::Role;
use crate::identity::IdentityGateway;
use crate::store::RowStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Session lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { session_id: Uuid, identity_id: Uuid },
    SignedOut { session_id: Uuid, identity_id: Uuid },
    /// Dropped during login because the role check failed.
    Revoked { session_id: Uuid, identity_id: Uuid },
}

/// Owns every live session. Built once at boot and shared with handlers.
#[derive(Clone)]
pub struct AuthContext {
    gateway: Arc<dyn IdentityGateway>,
    store: Arc<dyn RowStore>,
    sessions: Arc<dyn SessionStore>,
    events: broadcast::Sender<SessionEvent>,
    ttl: Duration,
}

impl AuthContext {
    pub fn new(
        gateway: Arc<dyn IdentityGateway>,
        store: Arc<dyn RowStore>,
        sessions: Arc<dyn SessionStore>,
        ttl: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            gateway,
            store,
            sessions,
            events,
            ttl,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Signs in, then gates the session on the profile's role.
    ///
    /// The session is stored as soon as the gateway accepts the credentials.
    /// If no profile exists, the lookup fails, or `expected` differs from the
    /// stored role, it is revoked before the error is returned.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        expected: Option<Role>,
    ) -> Result<Session, LoginError> {
        let result = self.try_authenticate(email, password, expected).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.outcome(),
        };
        metrics::counter!("aidboard_logins_total", "outcome" => outcome).increment(1);
        result
    }

    async fn try_authenticate(
        &self,
        email: &str,
        password: &str,
        expected: Option<Role>,
    ) -> Result<Session, LoginError> {
        let granted = self.gateway.sign_in_with_password(email, password).await?;
        let mut session = Session::from_gateway(granted);
        self.sessions.put(&session, session.ttl(self.ttl)).await?;
        self.emit(SessionEvent::SignedIn {
            session_id: session.id,
            identity_id: session.identity_id,
        });

        let failure = match resolve_role(self.store.as_ref(), &session.access_token, session.identity_id).await {
            Ok(Some(profile)) => match expected {
                Some(role) if role != profile.role => LoginError::RoleMismatch {
                    actual: profile.role,
                },
                _ => {
                    tracing::info!(
                        user_id = %profile.id,
                        role = %profile.role,
                        "operator signed in"
                    );
                    session.profile = Some(profile);
                    self.sessions.put(&session, session.ttl(self.ttl)).await?;
                    return Ok(session);
                }
            },
            Ok(None) => LoginError::ProfileNotProvisioned,
            Err(e) => {
                tracing::error!(error = %e, "profile lookup failed during login");
                LoginError::ProfileLookup(e.to_string())
            }
        };

        self.revoke(&session).await?;
        tracing::warn!(
            identity_id = %session.identity_id,
            reason = failure.outcome(),
            "session revoked after role check"
        );
        Err(failure)
    }

    async fn revoke(&self, session: &Session) -> Result<(), SessionStoreError> {
        self.sessions.remove(session.id).await?;
        self.emit(SessionEvent::Revoked {
            session_id: session.id,
            identity_id: session.identity_id,
        });
        Ok(())
    }

    /// Only sessions that passed the role check are returned.
    pub async fn get_session(&self, id: Uuid) -> Result<Option<Session>, SessionStoreError> {
        Ok(self
            .sessions
            .get(id)
            .await?
            .filter(|session| session.profile.is_some()))
    }

    /// Local sign-out: forgets this session only.
    pub async fn sign_out(&self, id: Uuid) -> Result<(), SessionStoreError> {
        let Some(session) = self.sessions.get(id).await? else {
            return Ok(());
        };
        self.sessions.remove(id).await?;
        self.emit(SessionEvent::SignedOut {
            session_id: session.id,
            identity_id: session.identity_id,
        });
        Ok(())
    }
}
