use super::{Filter, Query, RowStore, StoreError, StoreOp};
use crate::config::ConfigError;
use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde_json::Value;

pub static APIKEY_HEADER: &str = "apikey";
static PREFER_HEADER: &str = "prefer";

/// HTTP client for the hosted row store's REST interface.
#[derive(Clone)]
pub struct PostgrestStore {
    url: String,
    client: Client,
}

impl PostgrestStore {
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
                name: "row store client",
                reason: e.to_string(),
            })?;

        Ok(Self {
            url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
            client,
        })
    }

    fn request(&self, method: Method, table: &str, token: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.url, table))
            .bearer_auth(token)
    }

    async fn send(op: StoreOp, table: &str, builder: RequestBuilder) -> Result<Response, StoreError> {
        let res = builder.send().await.map_err(|e| StoreError::Unreachable {
            op,
            table: table.to_string(),
            message: e.to_string(),
        })?;

        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        tracing::error!(
            body = %body,
            status = %status,
            table = table,
            op = %op,
            "row store rejected request"
        );
        Err(StoreError::Rejected {
            op,
            table: table.to_string(),
            message: error_message(&body).unwrap_or_else(|| format!("{status}: {body}")),
        })
    }

    async fn representation(table: &str, res: Response) -> Result<Vec<Value>, StoreError> {
        res.json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Decode {
                table: table.to_string(),
                message: e.to_string(),
            })
    }

    async fn first_row(table: &str, res: Response) -> Result<Value, StoreError> {
        Self::representation(table, res)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode {
                table: table.to_string(),
                message: "empty representation".to_string(),
            })
    }
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(Filter::to_param).collect()
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// `Content-Range: 0-24/3573` or `*/3573`.
fn content_range_total(res: &Response) -> Option<u64> {
    res.headers()
        .get(header::CONTENT_RANGE)?
        .to_str()
        .ok()?
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

#[async_trait]
impl RowStore for PostgrestStore {
    async fn select(&self, token: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let builder = self
            .request(Method::GET, &query.table, token)
            .query(&query.params());
        let res = Self::send(StoreOp::Select, &query.table, builder).await?;
        Self::representation(&query.table, res).await
    }

    async fn count(&self, token: &str, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        let mut params = vec![("select".to_string(), "id".to_string())];
        params.extend(filter_params(filters));
        let builder = self
            .request(Method::HEAD, table, token)
            .header(PREFER_HEADER, "count=exact")
            .query(&params);
        let res = Self::send(StoreOp::Count, table, builder).await?;
        content_range_total(&res).ok_or_else(|| StoreError::Decode {
            table: table.to_string(),
            message: "missing content-range total".to_string(),
        })
    }

    async fn insert(&self, token: &str, table: &str, row: Value) -> Result<Value, StoreError> {
        let builder = self
            .request(Method::POST, table, token)
            .header(PREFER_HEADER, "return=representation")
            .json(&row);
        let res = Self::send(StoreOp::Insert, table, builder).await?;
        Self::first_row(table, res).await
    }

    async fn upsert(&self, token: &str, table: &str, row: Value) -> Result<Value, StoreError> {
        let builder = self
            .request(Method::POST, table, token)
            .header(PREFER_HEADER, "resolution=merge-duplicates,return=representation")
            .json(&row);
        let res = Self::send(StoreOp::Upsert, table, builder).await?;
        Self::first_row(table, res).await
    }

    async fn update(
        &self,
        token: &str,
        table: &str,
        patch: Value,
        filters: &[Filter],
    ) -> Result<u64, StoreError> {
        let builder = self
            .request(Method::PATCH, table, token)
            .header(PREFER_HEADER, "return=representation")
            .query(&filter_params(filters))
            .json(&patch);
        let res = Self::send(StoreOp::Update, table, builder).await?;
        Ok(Self::representation(table, res).await?.len() as u64)
    }

    async fn delete(&self, token: &str, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        let builder = self
            .request(Method::DELETE, table, token)
            .header(PREFER_HEADER, "return=representation")
            .query(&filter_params(filters));
        let res = Self::send(StoreOp::Delete, table, builder).await?;
        Ok(Self::representation(table, res).await?.len() as u64)
    }
}
