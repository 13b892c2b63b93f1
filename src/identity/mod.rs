//! Identity Gateway contract: password sign-in, token introspection and the
//! administrative user-creation call.

pub mod gotrue;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use gotrue::GoTrueClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Tokens issued by a successful password exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: Identity,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub email_confirm: bool,
    pub user_metadata: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The gateway answered with an error; `message` is its text.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected identity gateway response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<GatewaySession, IdentityError>;

    /// Resolves the identity behind an access token.
    async fn get_user(&self, access_token: &str) -> Result<Identity, IdentityError>;
}

/// Calls that need the service-role credential.
#[async_trait]
pub trait IdentityAdmin: Send + Sync {
    async fn create_user(&self, request: &NewIdentity) -> Result<Identity, IdentityError>;
}
