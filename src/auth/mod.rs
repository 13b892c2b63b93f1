//! Sessions, login and role resolution.

pub mod context;
pub mod roles;
pub mod sessions;

use crate::entities::Role;
use crate::identity::IdentityError;
use crate::locale;

pub use context::{AuthContext, SessionEvent};
pub use roles::resolve_role;
pub use sessions::{MemorySessionStore, RedisSessionStore, Session, SessionStore, SessionStoreError};

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("{}", locale::INVALID_CREDENTIALS)]
    InvalidCredentials,
    #[error("{}", locale::EMAIL_UNCONFIRMED)]
    EmailUnconfirmed,
    #[error("{}", locale::NETWORK_FAILURE)]
    Network,
    /// Any other gateway failure, carrying its raw text.
    #[error("{}: {0}", locale::LOGIN_FAILED)]
    Failed(String),
    #[error("{}", locale::role_mismatch(.actual))]
    RoleMismatch { actual: Role },
    #[error("{}", locale::PROFILE_NOT_PROVISIONED)]
    ProfileNotProvisioned,
    #[error("{}: {0}", locale::PROFILE_LOOKUP_FAILED)]
    ProfileLookup(String),
    #[error(transparent)]
    Sessions(#[from] SessionStoreError),
}

impl LoginError {
    /// Label for the login outcome metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            LoginError::InvalidCredentials => "invalid_credentials",
            LoginError::EmailUnconfirmed => "email_unconfirmed",
            LoginError::Network => "network",
            LoginError::Failed(_) => "failed",
            LoginError::RoleMismatch { .. } => "role_mismatch",
            LoginError::ProfileNotProvisioned => "profile_missing",
            LoginError::ProfileLookup(_) => "profile_lookup",
            LoginError::Sessions(_) => "session_store",
        }
    }
}

impl From<IdentityError> for LoginError {
    fn from(err: IdentityError) -> Self {
        let message = match err {
            IdentityError::Network(_) => return LoginError::Network,
            IdentityError::Rejected { message, .. } => message,
            IdentityError::Decode(message) => message,
        };
        if message.contains("Invalid login credentials") {
            LoginError::InvalidCredentials
        } else if message.contains("Email not confirmed") {
            LoginError::EmailUnconfirmed
        } else if message.to_lowercase().contains("network") {
            LoginError::Network
        } else {
            LoginError::Failed(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(message: &str) -> IdentityError {
        IdentityError::Rejected {
            status: 400,
            message: message.to_string(),
        }
    }

    #[test]
    fn maps_known_gateway_messages() {
        assert!(matches!(
            LoginError::from(rejected("Invalid login credentials")),
            LoginError::InvalidCredentials
        ));
        assert!(matches!(
            LoginError::from(rejected("Email not confirmed")),
            LoginError::EmailUnconfirmed
        ));
        assert!(matches!(
            LoginError::from(IdentityError::Network("connection refused".into())),
            LoginError::Network
        ));
    }

    #[test]
    fn unknown_messages_keep_raw_text() {
        let err = LoginError::from(rejected("Too many requests"));
        assert!(matches!(&err, LoginError::Failed(m) if m == "Too many requests"));
        assert!(err.to_string().ends_with("Too many requests"));
    }
}
