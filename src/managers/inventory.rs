use super::validation::{at_least, optional};
use super::{Actor, Creatable, Editable, Resource, Validate, ValidationError};
use crate::entities::{inventory, AssistanceCategory, InventoryStatus};
use crate::locale;
use crate::policy::EntityKind;
use crate::search::Searchable;
use crate::store::{Expand, Filter, Query};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;
use uuid::Uuid;

pub struct Inventory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistanceSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub category: AssistanceCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssigneeName {
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRow {
    #[serde(flatten)]
    pub item: inventory::Model,
    #[serde(default)]
    pub assistances: Option<AssistanceSummary>,
    #[serde(default)]
    pub profiles: Option<AssigneeName>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryForm {
    pub assistance_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl InventoryForm {
    /// Items handed to an employee are `assigned`, the rest `available`.
    pub fn status(&self) -> InventoryStatus {
        if self.assigned_to.is_some() {
            InventoryStatus::Assigned
        } else {
            InventoryStatus::Available
        }
    }
}

impl Validate for InventoryForm {
    fn validate(&self) -> Result<(), ValidationError> {
        at_least("quantity", self.quantity.into(), 1)
    }
}

impl Searchable for InventoryRow {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = Vec::new();
        if let Some(assistance) = &self.assistances {
            fields.push(Cow::Borrowed(assistance.name.as_str()));
            fields.push(Cow::Borrowed(locale::category_label(assistance.category)));
        }
        fields.extend(self.profiles.as_ref().map(|p| Cow::Borrowed(p.full_name.as_str())));
        fields.extend(self.item.notes.as_deref().map(Cow::Borrowed));
        fields
    }
}

impl Resource for Inventory {
    const ENTITY: EntityKind = EntityKind::Inventory;
    type Row = InventoryRow;

    fn list_query() -> Query {
        Query::table(Self::ENTITY.table())
            .expand(Expand::new("assistances", "assistances", "assistance_id").columns(["name", "type"]))
            .expand(Expand::new("profiles", "profiles", "assigned_to").columns(["full_name"]))
            .order_desc("created_at")
    }
}

impl Editable for Inventory {
    type Form = InventoryForm;

    fn update_patch(form: &InventoryForm) -> Value {
        json!({
            "assistance_id": form.assistance_id,
            "quantity": form.quantity,
            "assigned_to": form.assigned_to,
            "notes": optional(&form.notes),
        })
    }

    /// Statuses this service does not know are left as stored.
    fn guarded_patch(form: &InventoryForm) -> Option<(Value, Filter)> {
        Some((
            json!({ "status": form.status() }),
            Filter::one_of("status", InventoryStatus::DERIVED_LABELS),
        ))
    }
}

impl Creatable for Inventory {
    type Record = inventory::Model;

    fn insert_row(form: &InventoryForm, _actor: &Actor) -> Value {
        let mut row = Self::update_patch(form);
        row["status"] = json!(form.status());
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(assigned_to: Option<Uuid>, quantity: i32) -> InventoryForm {
        InventoryForm {
            assistance_id: Uuid::new_v4(),
            quantity,
            assigned_to,
            notes: None,
        }
    }

    #[test]
    fn status_follows_assignee() {
        let actor = crate::managers::test_support::actor(crate::entities::Role::Admin);
        let row = Inventory::insert_row(&form(None, 5), &actor);
        assert_eq!(row["status"], "available");
        let row = Inventory::insert_row(&form(Some(Uuid::new_v4()), 5), &actor);
        assert_eq!(row["status"], "assigned");
    }

    #[test]
    fn update_refreshes_status_unless_unknown() {
        assert!(Inventory::update_patch(&form(None, 5)).get("status").is_none());
        let (patch, guard) = Inventory::guarded_patch(&form(Some(Uuid::new_v4()), 5)).unwrap();
        assert_eq!(patch["status"], "assigned");
        assert!(!guard.matches(&json!({"status": "damaged"})));
        assert!(guard.matches(&json!({"status": "available"})));
        assert!(guard.matches(&json!({"status": "مخصص"})));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        assert!(form(None, 0).validate().is_err());
        assert!(form(None, 1).validate().is_ok());
    }
}
