//! Entity Managers.
//!
//! Every managed table goes through the same steps: check the Access Policy,
//! validate the form, issue one store call with the caller's token, then
//! record the audit entry. Tables plug in by implementing [`Resource`] and,
//! when writable, [`Editable`] / [`Creatable`].

pub mod assistance_types;
pub mod deliveries;
pub mod families;
pub mod inventory;
pub mod lookups;
pub mod operation_logs;
pub mod regions;
pub mod tasks;
pub mod users;
pub mod validation;

use crate::audit::{record_best_effort, AuditEntry, AuditRecorder};
use crate::entities::{ActionKind, Profile, Role};
use crate::error::AppError;
use crate::policy::{self, AccessDenied, EntityKind, Operation, Scope, Target};
use crate::search::{self, Searchable};
use crate::store::{decode, select_as, Filter, Query, RowStore};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

pub use validation::{Validate, ValidationError};

/// The signed-in operator on whose behalf a manager acts.
#[derive(Debug, Clone)]
pub struct Actor {
    pub profile: Profile,
    pub access_token: String,
}

impl Actor {
    pub fn new(profile: Profile, access_token: impl Into<String>) -> Self {
        Self {
            profile,
            access_token: access_token.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.profile.id
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }
}

pub trait Resource: Send + Sync + 'static {
    const ENTITY: EntityKind;

    /// Column holding the assignee, used when a role only sees its own rows.
    const OWNER_COLUMN: Option<&'static str> = None;

    /// List row, including any expanded display fields.
    type Row: DeserializeOwned + Serialize + Searchable + Send;

    /// Ordering and expansions for the list view.
    fn list_query() -> Query;
}

pub trait Editable: Resource {
    type Form: DeserializeOwned + Serialize + Validate + Send + Sync;

    fn update_patch(form: &Self::Form) -> Value;

    /// Follow-up patch applied only to rows that also match the filter.
    fn guarded_patch(_form: &Self::Form) -> Option<(Value, Filter)> {
        None
    }
}

pub trait Creatable: Editable {
    /// Row shape returned by the insert.
    type Record: DeserializeOwned + Serialize + Send;

    fn insert_row(form: &Self::Form, actor: &Actor) -> Value;
}

/// Status change on an assigned task or delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange<S> {
    pub status: S,
    #[serde(default)]
    pub notes: Option<String>,
}

pub trait StatusTracked: Resource {
    type Status: DeserializeOwned + Serialize + Send + Sync;

    fn status_patch(change: &StatusChange<Self::Status>) -> Value;

    /// Whether a client may set `status`. Unrecognised stored labels decode
    /// to a catch-all that is never written back.
    fn settable(status: &Self::Status) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Cancelled
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing was sent to the store.
    Cancelled,
}

pub struct EntityManager<R> {
    store: Arc<dyn RowStore>,
    audit: Arc<dyn AuditRecorder>,
    resource: PhantomData<fn() -> R>,
}

impl<R> Clone for EntityManager<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            audit: self.audit.clone(),
            resource: PhantomData,
        }
    }
}

fn id_filter(id: Uuid) -> Filter {
    Filter::eq("id", id.to_string())
}

fn row_id(row: &Value) -> String {
    match row.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Extra filter for roles limited to their own rows.
fn scope_filter<R: Resource>(scope: Scope, actor: &Actor, op: Operation) -> Result<Option<Filter>, AccessDenied> {
    match (scope, R::OWNER_COLUMN) {
        (Scope::All, _) => Ok(None),
        (Scope::Own, Some(column)) => Ok(Some(Filter::eq(column, actor.id().to_string()))),
        (Scope::Own, None) => Err(AccessDenied {
            role: actor.role(),
            target: Target::Entity(R::ENTITY, op),
        }),
    }
}

impl<R: Resource> EntityManager<R> {
    pub fn new(store: Arc<dyn RowStore>, audit: Arc<dyn AuditRecorder>) -> Self {
        Self {
            store,
            audit,
            resource: PhantomData,
        }
    }

    /// Rows visible to `actor`, newest first unless the table orders otherwise.
    pub async fn list(
        &self,
        actor: &Actor,
        filters: Vec<Filter>,
        search_term: Option<&str>,
    ) -> Result<Vec<R::Row>, AppError> {
        let scope = policy::authorize(actor.role(), R::ENTITY, Operation::Read)?;
        let mut query = R::list_query();
        for filter in filters {
            query = query.filter(filter);
        }
        if let Some(own) = scope_filter::<R>(scope, actor, Operation::Read)? {
            query = query.filter(own);
        }

        let rows = select_as::<R::Row>(self.store.as_ref(), &actor.access_token, &query).await?;
        Ok(match search_term {
            Some(term) => search::filter(rows, term),
            None => rows,
        })
    }

    async fn record(&self, actor: &Actor, kind: ActionKind, record_id: impl ToString, details: Option<Value>) {
        let table = R::ENTITY.table();
        let mut entry = AuditEntry::new(actor.id(), kind, R::ENTITY, record_id);
        if let Some(details) = details {
            entry = entry.with_details(details);
        }
        record_best_effort(self.audit.as_ref(), &actor.access_token, &entry).await;

        metrics::counter!("aidboard_mutations_total", "table" => table, "kind" => kind.as_str())
            .increment(1);
        tracing::Span::current()
            .record("table", table)
            .record("action", kind.as_str())
            .record("user_id", tracing::field::display(actor.id()))
            .record("record_id", entry.record_id.as_deref().unwrap_or_default())
            .record("business_event", entry.label.as_str());
        tracing::info!(
            table,
            action = %kind,
            user_id = %actor.id(),
            record_id = ?entry.record_id,
            "mutation applied"
        );
    }
}

impl<R: Editable> EntityManager<R> {
    /// Updates by id. The audit entry carries the submitted fields, not a diff.
    pub async fn update(&self, actor: &Actor, id: Uuid, form: R::Form) -> Result<(), AppError> {
        policy::authorize(actor.role(), R::ENTITY, Operation::Update)?;
        form.validate()?;

        let changed = self
            .store
            .update(
                &actor.access_token,
                R::ENTITY.table(),
                R::update_patch(&form),
                &[id_filter(id)],
            )
            .await?;
        if changed == 0 {
            return Err(AppError::NotFound);
        }
        if let Some((patch, guard)) = R::guarded_patch(&form) {
            self.store
                .update(&actor.access_token, R::ENTITY.table(), patch, &[id_filter(id), guard])
                .await?;
        }

        self.record(actor, ActionKind::Update, id, Some(serde_json::to_value(&form)?))
            .await;
        Ok(())
    }

    /// Irreversible. A cancelled confirmation never reaches the store.
    pub async fn delete(
        &self,
        actor: &Actor,
        id: Uuid,
        confirmation: Confirmation,
    ) -> Result<DeleteOutcome, AppError> {
        policy::authorize(actor.role(), R::ENTITY, Operation::Delete)?;
        if confirmation == Confirmation::Cancelled {
            return Ok(DeleteOutcome::Cancelled);
        }

        let table = R::ENTITY.table();
        let removed = self
            .store
            .delete(&actor.access_token, table, &[id_filter(id)])
            .await?;
        if removed == 0 {
            return Err(AppError::NotFound);
        }

        metrics::gauge!("aidboard_rows_total", "table" => table).decrement(removed as f64);
        self.record(actor, ActionKind::Delete, id, None).await;
        Ok(DeleteOutcome::Deleted)
    }
}

impl<R: Creatable> EntityManager<R> {
    pub async fn create(&self, actor: &Actor, form: R::Form) -> Result<R::Record, AppError> {
        policy::authorize(actor.role(), R::ENTITY, Operation::Create)?;
        form.validate()?;

        let table = R::ENTITY.table();
        let row = self
            .store
            .insert(&actor.access_token, table, R::insert_row(&form, actor))
            .await?;
        let id = row_id(&row);

        metrics::gauge!("aidboard_rows_total", "table" => table).increment(1.0);
        self.record(actor, ActionKind::Create, &id, Some(serde_json::to_value(&form)?))
            .await;
        Ok(decode(table, row)?)
    }
}

impl<R: StatusTracked> EntityManager<R> {
    /// Employees may only change rows assigned to them.
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        change: StatusChange<R::Status>,
    ) -> Result<(), AppError> {
        let scope = policy::authorize(actor.role(), R::ENTITY, Operation::UpdateStatus)?;
        if !R::settable(&change.status) {
            return Err(ValidationError::UnknownStatus.into());
        }
        let mut filters = vec![id_filter(id)];
        filters.extend(scope_filter::<R>(scope, actor, Operation::UpdateStatus)?);

        let patch = R::status_patch(&change);
        let changed = self
            .store
            .update(&actor.access_token, R::ENTITY.table(), patch.clone(), &filters)
            .await?;
        if changed == 0 {
            return Err(AppError::NotFound);
        }

        self.record(actor, ActionKind::Update, id, Some(patch)).await;
        Ok(())
    }
}
