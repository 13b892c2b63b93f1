//! In-process row store used by tests and local development.
//!
//! Behaves like the hosted store for the subset of the API this service uses:
//! equality and membership filters, single-column ordering, limits, nested foreign-key
//! expansion, generated `id` and timestamps, and upsert on `id`.

use super::{Expand, Filter, Query, RowStore, StoreError, StoreOp};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    calls: Mutex<HashMap<(StoreOp, String), usize>>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row without counting it as a call.
    pub fn seed(&self, table: &str, row: Value) -> Value {
        let row = stamp(row);
        lock(&self.tables)
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        row
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        lock(&self.tables).get(table).cloned().unwrap_or_default()
    }

    pub fn calls(&self, op: StoreOp, table: &str) -> usize {
        lock(&self.calls)
            .get(&(op, table.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Every subsequent operation on `table` is rejected.
    pub fn fail_table(&self, table: &str) {
        lock(&self.failing).insert(table.to_string());
    }

    fn enter(&self, op: StoreOp, table: &str) -> Result<(), StoreError> {
        *lock(&self.calls).entry((op, table.to_string())).or_default() += 1;
        if lock(&self.failing).contains(table) {
            return Err(StoreError::Rejected {
                op,
                table: table.to_string(),
                message: "permission denied".to_string(),
            });
        }
        Ok(())
    }

    fn expand_row(tables: &HashMap<String, Vec<Value>>, row: &mut Value, expand: &Expand) {
        let related = row
            .get(&expand.fk)
            .filter(|fk| !fk.is_null())
            .and_then(|fk| {
                tables
                    .get(&expand.table)?
                    .iter()
                    .find(|candidate| candidate.get("id") == Some(fk))
                    .cloned()
            })
            .map(|mut target| {
                for inner in &expand.nested {
                    Self::expand_row(tables, &mut target, inner);
                }
                project(target, &expand.columns, &expand.nested)
            })
            .unwrap_or(Value::Null);

        if let Some(object) = row.as_object_mut() {
            object.insert(expand.alias.clone(), related);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn stamp(mut row: Value) -> Value {
    if let Some(object) = row.as_object_mut() {
        object
            .entry("id")
            .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
        let now = Value::String(chrono::Utc::now().to_rfc3339());
        object.entry("created_at").or_insert_with(|| now.clone());
        object.entry("updated_at").or_insert(now);
    }
    row
}

fn project(row: Value, columns: &[String], nested: &[Expand]) -> Value {
    if columns.is_empty() && nested.is_empty() {
        return row;
    }
    let mut out = Map::new();
    for key in columns
        .iter()
        .chain(nested.iter().map(|inner| &inner.alias))
    {
        out.insert(key.clone(), row.get(key).cloned().unwrap_or(Value::Null));
    }
    Value::Object(out)
}

fn matches_all(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| filter.matches(row))
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn select(&self, _token: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        self.enter(StoreOp::Select, &query.table)?;
        let tables = lock(&self.tables);
        let mut rows: Vec<Value> = tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_all(row, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let left = a.get(&order.column).unwrap_or(&Value::Null);
                let right = b.get(&order.column).unwrap_or(&Value::Null);
                let ord = compare(left, right);
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        for row in rows.iter_mut() {
            for expand in &query.expand {
                Self::expand_row(&tables, row, expand);
            }
        }

        if query.columns.is_empty() {
            return Ok(rows);
        }
        let aliases: Vec<String> = query.expand.iter().map(|e| e.alias.clone()).collect();
        Ok(rows
            .into_iter()
            .map(|row| {
                let mut out = Map::new();
                for key in query.columns.iter().chain(aliases.iter()) {
                    out.insert(key.clone(), row.get(key).cloned().unwrap_or(Value::Null));
                }
                Value::Object(out)
            })
            .collect())
    }

    async fn count(&self, _token: &str, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        self.enter(StoreOp::Count, table)?;
        Ok(lock(&self.tables)
            .get(table)
            .map(|rows| rows.iter().filter(|row| matches_all(row, filters)).count())
            .unwrap_or(0) as u64)
    }

    async fn insert(&self, _token: &str, table: &str, row: Value) -> Result<Value, StoreError> {
        self.enter(StoreOp::Insert, table)?;
        let row = stamp(row);
        lock(&self.tables)
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn upsert(&self, _token: &str, table: &str, row: Value) -> Result<Value, StoreError> {
        self.enter(StoreOp::Upsert, table)?;
        let row = stamp(row);
        let mut tables = lock(&self.tables);
        let rows = tables.entry(table.to_string()).or_default();
        match rows.iter_mut().find(|existing| existing.get("id") == row.get("id")) {
            Some(existing) => {
                merge(existing, &row);
                Ok(existing.clone())
            }
            None => {
                rows.push(row.clone());
                Ok(row)
            }
        }
    }

    async fn update(
        &self,
        _token: &str,
        table: &str,
        patch: Value,
        filters: &[Filter],
    ) -> Result<u64, StoreError> {
        self.enter(StoreOp::Update, table)?;
        let mut tables = lock(&self.tables);
        let mut changed = 0;
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|row| matches_all(row, filters)) {
                merge(row, &patch);
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete(&self, _token: &str, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        self.enter(StoreOp::Delete, table)?;
        let mut tables = lock(&self.tables);
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !matches_all(row, filters));
        Ok((before - rows.len()) as u64)
    }
}
