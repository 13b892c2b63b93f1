use super::validation::{optional, required};
use super::{Actor, Creatable, Editable, Resource, Validate, ValidationError};
use crate::entities::{assistance, AssistanceCategory};
use crate::locale;
use crate::policy::EntityKind;
use crate::search::Searchable;
use crate::store::Query;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;

pub struct AssistanceTypes;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistanceForm {
    pub name: String,
    #[serde(rename = "type")]
    pub category: AssistanceCategory,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for AssistanceForm {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)
    }
}

/// Category is matched by its operator-language label as well as the name.
impl Searchable for assistance::Model {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.name.as_str()),
            Cow::Borrowed(locale::category_label(self.category)),
        ];
        fields.extend(self.description.as_deref().map(Cow::Borrowed));
        fields
    }
}

impl Resource for AssistanceTypes {
    const ENTITY: EntityKind = EntityKind::AssistanceTypes;
    type Row = assistance::Model;

    fn list_query() -> Query {
        Query::table(Self::ENTITY.table()).order_desc("created_at")
    }
}

impl Editable for AssistanceTypes {
    type Form = AssistanceForm;

    fn update_patch(form: &AssistanceForm) -> Value {
        json!({
            "name": form.name.trim(),
            "type": form.category,
            "description": optional(&form.description),
        })
    }
}

impl Creatable for AssistanceTypes {
    type Record = assistance::Model;

    fn insert_row(form: &AssistanceForm, actor: &Actor) -> Value {
        let mut row = Self::update_patch(form);
        row["created_by"] = json!(actor.id());
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_accepts_legacy_category_labels() {
        let form: AssistanceForm =
            serde_json::from_value(json!({"name": "سلة غذائية", "type": "غذائية"})).unwrap();
        assert_eq!(form.category, AssistanceCategory::Food);
        assert_eq!(AssistanceTypes::update_patch(&form)["type"], "food");
    }
}
