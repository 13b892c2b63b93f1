//! The privileged create-user function.
//!
//! Deployed on its own with the service-role key. It checks the caller's
//! public key and session, requires an admin profile, creates a confirmed
//! identity and upserts its profile row.

use super::client::ProvisionResponse;
use crate::entities::{Profile, Role, UnknownRole};
use crate::identity::{IdentityAdmin, IdentityGateway, NewIdentity};
use crate::locale;
use crate::policy::EntityKind;
use crate::store::postgrest::APIKEY_HEADER;
use crate::store::{select_one, Filter, Query, RowStore};
use axum::{
    body::Bytes,
    extract::Extension,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

#[derive(Clone)]
pub struct FunctionState {
    pub gateway: Arc<dyn IdentityGateway>,
    pub admin: Arc<dyn IdentityAdmin>,
    /// Store client holding the service-role credential.
    pub store: Arc<dyn RowStore>,
    pub service_token: String,
    pub anon_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FunctionError {
    #[error("No API key found in request")]
    MissingApiKey,
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("{}", locale::SIGN_IN_REQUIRED)]
    Unauthenticated,
    #[error("{}", locale::ACCESS_DENIED)]
    Forbidden,
    #[error("{}", locale::MISSING_FIELDS)]
    MissingFields,
    #[error(transparent)]
    InvalidRole(#[from] UnknownRole),
    /// Identity creation failed; carries the gateway's message.
    #[error("{0}")]
    Identity(String),
    #[error("{0}")]
    Profile(String),
    #[error("{0}")]
    Unexpected(String),
}

impl FunctionError {
    pub fn status(&self) -> StatusCode {
        match self {
            FunctionError::MissingApiKey
            | FunctionError::InvalidApiKey
            | FunctionError::Unauthenticated => StatusCode::UNAUTHORIZED,
            FunctionError::Forbidden => StatusCode::FORBIDDEN,
            FunctionError::MissingFields
            | FunctionError::InvalidRole(_)
            | FunctionError::Identity(_)
            | FunctionError::Profile(_) => StatusCode::BAD_REQUEST,
            FunctionError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "create-user failed");
        } else {
            tracing::warn!(error = %self, status = %status, "create-user rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct CreateUserBody {
    email: Option<String>,
    password: Option<String>,
    full_name: Option<String>,
    role: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Only an authenticated admin may mint identities.
async fn authorize_caller(state: &FunctionState, headers: &HeaderMap) -> Result<Profile, FunctionError> {
    let key = headers
        .get(APIKEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(FunctionError::MissingApiKey)?;
    if key != state.anon_key && key != state.service_token {
        return Err(FunctionError::InvalidApiKey);
    }

    let token = bearer(headers).ok_or(FunctionError::Unauthenticated)?;
    let caller = state
        .gateway
        .get_user(token)
        .await
        .map_err(|_| FunctionError::Unauthenticated)?;

    let query = Query::table(EntityKind::Users.table()).filter(Filter::eq("id", caller.id.to_string()));
    let profile: Option<Profile> = select_one(state.store.as_ref(), &state.service_token, query)
        .await
        .map_err(|e| FunctionError::Unexpected(e.to_string()))?;

    match profile {
        Some(profile) if profile.role == Role::Admin && profile.is_active => Ok(profile),
        _ => Err(FunctionError::Forbidden),
    }
}

pub async fn create_user(
    Extension(state): Extension<FunctionState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ProvisionResponse>, FunctionError> {
    let caller = authorize_caller(&state, &headers).await?;

    let body: CreateUserBody =
        serde_json::from_slice(&body).map_err(|e| FunctionError::Unexpected(e.to_string()))?;
    let (Some(email), Some(password), Some(full_name), Some(role)) = (
        present(body.email),
        present(body.password),
        present(body.full_name),
        present(body.role),
    ) else {
        return Err(FunctionError::MissingFields);
    };
    let role: Role = role.parse()?;

    let identity = state
        .admin
        .create_user(&NewIdentity {
            email: email.trim().to_string(),
            password,
            email_confirm: true,
            user_metadata: json!({ "full_name": full_name, "role": role }),
        })
        .await
        .map_err(|e| FunctionError::Identity(e.to_string()))?;

    state
        .store
        .upsert(
            &state.service_token,
            EntityKind::Users.table(),
            json!({
                "id": identity.id,
                "full_name": full_name,
                "role": role,
                "is_active": true,
            }),
        )
        .await
        .map_err(|e| FunctionError::Profile(e.to_string()))?;

    tracing::info!(
        created_by = %caller.id,
        user_id = %identity.id,
        role = %role,
        "identity provisioned"
    );
    Ok(Json(ProvisionResponse {
        success: true,
        user: identity,
    }))
}

/// `allowed_origin` of `None` keeps the permissive `*` origin.
pub fn router(state: FunctionState, allowed_origin: Option<HeaderValue>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static(APIKEY_HEADER),
        ])
        .allow_origin(match allowed_origin {
            Some(origin) => AllowOrigin::exact(origin),
            None => AllowOrigin::any(),
        });

    let handler = post(create_user).options(|| async { StatusCode::OK });
    Router::new()
        .route("/functions/create-user", handler.clone())
        .route("/functions/v1/create-user", handler)
        .layer(Extension(state))
        .layer(cors)
}
