use crate::config::ConfigError;
use crate::entities::Role;
use crate::identity::Identity;
use crate::store::postgrest::APIKEY_HEADER;
use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a create-user call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionResponse {
    pub success: bool,
    pub user: Identity,
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The function answered with an error body; `message` is its text.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("user creation function unreachable: {0}")]
    Unreachable(String),
    #[error("unexpected user creation response: {0}")]
    Decode(String),
}

impl ProvisionError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProvisionError::Rejected { status, .. } => match *status {
                400 => StatusCode::BAD_REQUEST,
                401 => StatusCode::UNAUTHORIZED,
                403 => StatusCode::FORBIDDEN,
                _ => StatusCode::BAD_GATEWAY,
            },
            ProvisionError::Unreachable(_) | ProvisionError::Decode(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Creates login identities on behalf of an admin.
#[async_trait]
pub trait UserProvisioner: Send + Sync {
    async fn create_user(
        &self,
        access_token: &str,
        request: &ProvisionRequest,
    ) -> Result<Identity, ProvisionError>;
}

/// Calls the deployed create-user function with the caller's token.
pub struct HttpUserProvisioner {
    url: String,
    client: Client,
}

impl HttpUserProvisioner {
    pub fn new(url: &str, anon_key: &str) -> Result<Self, ConfigError> {
        let mut headers = header::HeaderMap::new();
        let key = header::HeaderValue::from_str(anon_key).map_err(|e| ConfigError::Invalid {
            name: "SUPABASE_ANON_KEY",
            reason: e.to_string(),
        })?;
        headers.insert(APIKEY_HEADER, key);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::Invalid {
                name: "CREATE_USER_FUNCTION_URL",
                reason: e.to_string(),
            })?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl UserProvisioner for HttpUserProvisioner {
    async fn create_user(
        &self,
        access_token: &str,
        request: &ProvisionRequest,
    ) -> Result<Identity, ProvisionError> {
        let res = self
            .client
            .post(&self.url)
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await
            .map_err(|e| ProvisionError::Unreachable(e.to_string()))?;

        let status = res.status();
        let body: Value = res
            .json()
            .await
            .map_err(|e| ProvisionError::Decode(e.to_string()))?;

        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string());
            tracing::warn!(status = %status, error = %message, "user creation rejected");
            return Err(ProvisionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let created: ProvisionResponse =
            serde_json::from_value(body).map_err(|e| ProvisionError::Decode(e.to_string()))?;
        Ok(created.user)
    }
}
