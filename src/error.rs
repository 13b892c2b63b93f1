use crate::auth::{LoginError, SessionStoreError};
use crate::functions::ProvisionError;
use crate::locale;
use crate::managers::ValidationError;
use crate::policy::AccessDenied;
use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error("{}", locale::ACCESS_DENIED)]
    Forbidden(#[from] AccessDenied),
    #[error("{}", locale::SIGN_IN_REQUIRED)]
    Unauthorized,
    #[error("{}", locale::NOT_FOUND)]
    NotFound,
    #[error("{}", locale::CONFIRM_DELETE)]
    ConfirmationRequired,
    /// Raw backend text, naming the failed operation.
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Provision(#[from] ProvisionError),
    #[error(transparent)]
    Sessions(#[from] SessionStoreError),
    #[error("{}", locale::UNEXPECTED_ERROR)]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Login(e) => match e {
                LoginError::InvalidCredentials
                | LoginError::EmailUnconfirmed
                | LoginError::Failed(_) => StatusCode::UNAUTHORIZED,
                LoginError::RoleMismatch { .. } | LoginError::ProfileNotProvisioned => {
                    StatusCode::FORBIDDEN
                }
                LoginError::Network | LoginError::ProfileLookup(_) => StatusCode::BAD_GATEWAY,
                LoginError::Sessions(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::ConfirmationRequired => StatusCode::PRECONDITION_REQUIRED,
            AppError::Store(_) => StatusCode::BAD_GATEWAY,
            AppError::Provision(e) => e.status(),
            AppError::Sessions(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let span = tracing::Span::current();
        match &self {
            AppError::Forbidden(denied) => {
                span.record("error", tracing::field::display(denied));
                tracing::warn!(error = %denied, "access denied");
            }
            AppError::Internal(detail) => {
                span.record("error", detail.as_str());
                tracing::error!(error = %detail, "unexpected failure");
            }
            other if status.is_server_error() => {
                span.record("error", tracing::field::display(other));
                tracing::error!(error = %other, "request failed");
            }
            other => {
                span.record("error", tracing::field::display(other));
            }
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Role;
    use crate::policy::{EntityKind, Operation, Target};
    use crate::store::StoreOp;

    #[test]
    fn maps_status_codes() {
        let denied = AccessDenied {
            role: Role::Employee,
            target: Target::Entity(EntityKind::Regions, Operation::Create),
        };
        assert_eq!(AppError::from(denied).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::ConfirmationRequired.status(),
            StatusCode::PRECONDITION_REQUIRED
        );
        assert_eq!(
            AppError::from(LoginError::RoleMismatch { actual: Role::Admin }).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(ValidationError::Required("name")).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn store_errors_keep_backend_text() {
        let err = AppError::from(StoreError::Rejected {
            op: StoreOp::Insert,
            table: "families".into(),
            message: "new row violates row-level security policy".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        let text = err.to_string();
        assert!(text.contains("insert on families"));
        assert!(text.contains("row-level security"));
    }

    #[test]
    fn denial_message_is_localized() {
        let err = AppError::from(AccessDenied {
            role: Role::Manager,
            target: Target::Entity(EntityKind::Users, Operation::Delete),
        });
        assert_eq!(err.to_string(), locale::ACCESS_DENIED);
    }
}
