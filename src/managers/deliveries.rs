use super::inventory::AssistanceSummary;
use super::validation::optional;
use super::{Resource, StatusChange, StatusTracked};
use crate::entities::{delivery, DeliveryStatus};
use crate::locale;
use crate::policy::EntityKind;
use crate::search::Searchable;
use crate::store::{Expand, Query};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;

pub struct Deliveries;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryFamily {
    pub family_name: String,
    pub head_of_family: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub location_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryItem {
    #[serde(default)]
    pub assistances: Option<AssistanceSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRow {
    #[serde(flatten)]
    pub delivery: delivery::Model,
    #[serde(default)]
    pub families: Option<DeliveryFamily>,
    #[serde(default)]
    pub inventory: Option<DeliveryItem>,
}

impl Searchable for DeliveryRow {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = Vec::new();
        if let Some(family) = &self.families {
            fields.push(Cow::Borrowed(family.family_name.as_str()));
            fields.push(Cow::Borrowed(family.head_of_family.as_str()));
            fields.extend(family.address.as_deref().map(Cow::Borrowed));
        }
        if let Some(assistance) = self.inventory.as_ref().and_then(|i| i.assistances.as_ref()) {
            fields.push(Cow::Borrowed(assistance.name.as_str()));
            fields.push(Cow::Borrowed(locale::category_label(assistance.category)));
        }
        fields.extend(self.delivery.delivery_notes.as_deref().map(Cow::Borrowed));
        fields
    }
}

impl Resource for Deliveries {
    const ENTITY: EntityKind = EntityKind::Deliveries;
    const OWNER_COLUMN: Option<&'static str> = Some("employee_id");
    type Row = DeliveryRow;

    /// Soonest scheduled first.
    fn list_query() -> Query {
        Query::table(Self::ENTITY.table())
            .expand(Expand::new("families", "families", "family_id").columns([
                "family_name",
                "head_of_family",
                "phone",
                "address",
                "location_link",
            ]))
            .expand(
                Expand::new("inventory", "inventory", "inventory_id").nest(
                    Expand::new("assistances", "assistances", "assistance_id").columns(["name", "type"]),
                ),
            )
            .order_asc("scheduled_date")
    }
}

impl StatusTracked for Deliveries {
    type Status = DeliveryStatus;

    /// `delivered_at` is stamped only on `delivered`; notes are kept when blank.
    fn status_patch(change: &StatusChange<DeliveryStatus>) -> Value {
        let mut patch = json!({ "status": change.status });
        if let Some(notes) = optional(&change.notes) {
            patch["delivery_notes"] = json!(notes);
        }
        if change.status == DeliveryStatus::Delivered {
            patch["delivered_at"] = json!(chrono::Utc::now().to_rfc3339());
        }
        patch
    }

    fn settable(status: &DeliveryStatus) -> bool {
        *status != DeliveryStatus::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivered_at_only_on_delivery() {
        let patch = Deliveries::status_patch(&StatusChange {
            status: DeliveryStatus::InTransit,
            notes: Some("  ".into()),
        });
        assert_eq!(patch, json!({ "status": "in_transit" }));

        let patch = Deliveries::status_patch(&StatusChange {
            status: DeliveryStatus::Delivered,
            notes: Some("left with neighbour".into()),
        });
        assert_eq!(patch["delivery_notes"], "left with neighbour");
        assert!(patch["delivered_at"].is_string());
    }
}
