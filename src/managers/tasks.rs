use super::validation::{optional, required};
use super::{
    Actor, Creatable, Editable, Resource, StatusChange, StatusTracked, Validate, ValidationError,
};
use crate::entities::{task, TaskPriority, TaskStatus};
use crate::policy::EntityKind;
use crate::search::Searchable;
use crate::store::{Expand, Query};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;
use uuid::Uuid;

pub use super::inventory::AssigneeName;

pub struct Tasks;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRow {
    #[serde(flatten)]
    pub task: task::Model,
    #[serde(default)]
    pub profiles: Option<AssigneeName>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskForm {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub assigned_to: Uuid,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl Validate for TaskForm {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)
    }
}

impl Searchable for TaskRow {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Borrowed(self.task.title.as_str())];
        fields.extend(self.task.description.as_deref().map(Cow::Borrowed));
        fields.extend(self.profiles.as_ref().map(|p| Cow::Borrowed(p.full_name.as_str())));
        fields
    }
}

impl Resource for Tasks {
    const ENTITY: EntityKind = EntityKind::Tasks;
    const OWNER_COLUMN: Option<&'static str> = Some("assigned_to");
    type Row = TaskRow;

    fn list_query() -> Query {
        Query::table(Self::ENTITY.table())
            .expand(Expand::new("profiles", "profiles", "assigned_to").columns(["full_name"]))
            .order_desc("created_at")
    }
}

impl Editable for Tasks {
    type Form = TaskForm;

    fn update_patch(form: &TaskForm) -> Value {
        json!({
            "title": form.title.trim(),
            "description": optional(&form.description),
            "assigned_to": form.assigned_to,
            "priority": form.priority,
            "due_date": form.due_date,
        })
    }
}

impl Creatable for Tasks {
    type Record = task::Model;

    /// New tasks always start as `new`.
    fn insert_row(form: &TaskForm, actor: &Actor) -> Value {
        let mut row = Self::update_patch(form);
        row["status"] = json!(TaskStatus::New);
        row["created_by"] = json!(actor.id());
        row
    }
}

impl StatusTracked for Tasks {
    type Status = TaskStatus;

    fn status_patch(change: &StatusChange<TaskStatus>) -> Value {
        json!({ "status": change.status })
    }

    fn settable(status: &TaskStatus) -> bool {
        *status != TaskStatus::Other
    }
}
