use super::{Actor, EntityManager, Resource};
use crate::entities::{operation_log, ActionKind};
use crate::error::AppError;
use crate::policy::EntityKind;
use crate::search::Searchable;
use crate::store::{Expand, Query};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// The viewer only ever shows this many entries.
pub const RECENT_LIMIT: usize = 100;

pub struct OperationLogs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorName {
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRow {
    #[serde(flatten)]
    pub entry: operation_log::Model,
    #[serde(default)]
    pub profiles: Option<ActorName>,
}

/// A log row with its color tag, keyed off the stored kind.
#[derive(Debug, Clone, Serialize)]
pub struct LogView {
    #[serde(flatten)]
    pub row: LogRow,
    pub tone: &'static str,
}

impl From<LogRow> for LogView {
    fn from(row: LogRow) -> Self {
        let tone = row.entry.action_kind.tone();
        Self { row, tone }
    }
}

impl Searchable for LogRow {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.entry.action.as_str()),
            Cow::Borrowed(self.entry.table_name.as_str()),
        ];
        fields.extend(self.profiles.as_ref().map(|p| Cow::Borrowed(p.full_name.as_str())));
        fields
    }
}

impl Resource for OperationLogs {
    const ENTITY: EntityKind = EntityKind::OperationLogs;
    type Row = LogRow;

    fn list_query() -> Query {
        Query::table(Self::ENTITY.table())
            .expand(Expand::new("profiles", "profiles", "user_id").columns(["full_name"]))
            .order_desc("created_at")
            .limit(RECENT_LIMIT)
    }
}

impl EntityManager<OperationLogs> {
    /// Latest entries, newest first. The kind filter and search both run
    /// over the fetched page.
    pub async fn recent(
        &self,
        actor: &Actor,
        kind: Option<ActionKind>,
        search_term: Option<&str>,
    ) -> Result<Vec<LogView>, AppError> {
        let mut rows = self.list(actor, Vec::new(), search_term).await?;
        if let Some(kind) = kind {
            rows.retain(|row| row.entry.action_kind == kind);
        }
        Ok(rows.into_iter().map(LogView::from).collect())
    }
}
