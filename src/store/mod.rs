//! Row Store contract.
//!
//! The relational backend is an external collaborator reached over a
//! PostgREST-style API. Every call carries the caller's bearer token so the
//! backend's row-level security sees the real identity.

pub mod memory;
pub mod postgrest;
pub mod query;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;
pub use query::{Expand, Filter, FilterOp, Order, Query};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Select,
    Count,
    Insert,
    Upsert,
    Update,
    Delete,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreOp::Select => "select",
            StoreOp::Count => "count",
            StoreOp::Insert => "insert",
            StoreOp::Upsert => "upsert",
            StoreOp::Update => "update",
            StoreOp::Delete => "delete",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend answered with an error; `message` is its raw text.
    #[error("{op} on {table} failed: {message}")]
    Rejected {
        op: StoreOp,
        table: String,
        message: String,
    },
    #[error("{op} on {table} failed: row store unreachable: {message}")]
    Unreachable {
        op: StoreOp,
        table: String,
        message: String,
    },
    #[error("could not decode {table} rows: {message}")]
    Decode { table: String, message: String },
}

#[async_trait]
pub trait RowStore: Send + Sync {
    async fn select(&self, token: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Count-only query; no rows are transferred.
    async fn count(&self, token: &str, table: &str, filters: &[Filter]) -> Result<u64, StoreError>;

    async fn insert(&self, token: &str, table: &str, row: Value) -> Result<Value, StoreError>;

    /// Insert or merge on primary key.
    async fn upsert(&self, token: &str, table: &str, row: Value) -> Result<Value, StoreError>;

    /// Returns the number of rows changed.
    async fn update(
        &self,
        token: &str,
        table: &str,
        patch: Value,
        filters: &[Filter],
    ) -> Result<u64, StoreError>;

    /// Returns the number of rows removed.
    async fn delete(&self, token: &str, table: &str, filters: &[Filter]) -> Result<u64, StoreError>;
}

pub async fn select_as<T: DeserializeOwned>(
    store: &dyn RowStore,
    token: &str,
    query: &Query,
) -> Result<Vec<T>, StoreError> {
    let rows = store.select(token, query).await?;
    rows.into_iter()
        .map(|row| decode(&query.table, row))
        .collect()
}

pub async fn select_one<T: DeserializeOwned>(
    store: &dyn RowStore,
    token: &str,
    query: Query,
) -> Result<Option<T>, StoreError> {
    let query = query.limit(1);
    Ok(select_as::<T>(store, token, &query).await?.into_iter().next())
}

pub fn decode<T: DeserializeOwned>(table: &str, row: Value) -> Result<T, StoreError> {
    serde_json::from_value(row).map_err(|e| StoreError::Decode {
        table: table.to_string(),
        message: e.to_string(),
    })
}
