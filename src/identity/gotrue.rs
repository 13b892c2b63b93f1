use super::{GatewaySession, Identity, IdentityAdmin, IdentityError, IdentityGateway, NewIdentity};
use crate::config::ConfigError;
use crate::store::postgrest::APIKEY_HEADER;
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// HTTP client for the hosted auth service.
#[derive(Clone)]
pub struct GoTrueClient {
    url: String,
    client: Client,
    service_key: Option<String>,
}

impl GoTrueClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ConfigError> {
        let mut headers = header::HeaderMap::new();
        let key = header::HeaderValue::from_str(api_key).map_err(|e| ConfigError::Invalid {
            name: "api key",
            reason: e.to_string(),
        })?;
        headers.insert(APIKEY_HEADER, key);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::Invalid {
                name: "identity client",
                reason: e.to_string(),
            })?;

        Ok(Self {
            url: format!("{}/auth/v1", base_url.trim_end_matches('/')),
            client,
            service_key: None,
        })
    }

    /// Client allowed to call the admin endpoints.
    pub fn admin(base_url: &str, service_role_key: &str) -> Result<Self, ConfigError> {
        let mut client = Self::new(base_url, service_role_key)?;
        client.service_key = Some(service_role_key.to_string());
        Ok(client)
    }

    async fn parse<T: DeserializeOwned>(res: Response) -> Result<T, IdentityError> {
        let status = res.status();
        if status.is_success() {
            return res
                .json::<T>()
                .await
                .map_err(|e| IdentityError::Decode(e.to_string()));
        }

        let body = res.text().await.unwrap_or_default();
        tracing::warn!(
            body = %body,
            status = %status,
            "identity gateway rejected request"
        );
        Err(IdentityError::Rejected {
            status: status.as_u16(),
            message: error_message(&body).unwrap_or_else(|| status.to_string()),
        })
    }
}

/// The gateway has used several error shapes over time.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn network(e: reqwest::Error) -> IdentityError {
    IdentityError::Network(e.to_string())
}

#[async_trait]
impl IdentityGateway for GoTrueClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<GatewaySession, IdentityError> {
        let res = self
            .client
            .post(format!("{}/token", self.url))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(network)?;
        Self::parse(res).await
    }

    async fn get_user(&self, access_token: &str) -> Result<Identity, IdentityError> {
        let res = self
            .client
            .get(format!("{}/user", self.url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network)?;
        Self::parse(res).await
    }
}

#[async_trait]
impl IdentityAdmin for GoTrueClient {
    async fn create_user(&self, request: &NewIdentity) -> Result<Identity, IdentityError> {
        let Some(service_key) = &self.service_key else {
            return Err(IdentityError::Rejected {
                status: 403,
                message: "admin calls require the service role key".to_string(),
            });
        };
        let res = self
            .client
            .post(format!("{}/admin/users", self.url))
            .bearer_auth(service_key)
            .json(request)
            .send()
            .await
            .map_err(network)?;
        Self::parse(res).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_every_error_shape() {
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
                .as_deref(),
            Some("Invalid login credentials")
        );
        assert_eq!(
            error_message(r#"{"code":400,"error_code":"email_not_confirmed","msg":"Email not confirmed"}"#)
                .as_deref(),
            Some("Email not confirmed")
        );
        assert_eq!(error_message("oops"), None);
    }
}
