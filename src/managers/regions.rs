use super::validation::{optional, required};
use super::{Actor, Creatable, Editable, Resource, Validate, ValidationError};
use crate::entities::region;
use crate::policy::EntityKind;
use crate::search::Searchable;
use crate::store::Query;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;

pub struct Regions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for RegionForm {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)
    }
}

impl Searchable for region::Model {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Borrowed(self.name.as_str())];
        fields.extend(self.description.as_deref().map(Cow::Borrowed));
        fields
    }
}

impl Resource for Regions {
    const ENTITY: EntityKind = EntityKind::Regions;
    type Row = region::Model;

    fn list_query() -> Query {
        Query::table(Self::ENTITY.table()).order_desc("created_at")
    }
}

impl Editable for Regions {
    type Form = RegionForm;

    fn update_patch(form: &RegionForm) -> Value {
        json!({
            "name": form.name.trim(),
            "description": optional(&form.description),
        })
    }
}

impl Creatable for Regions {
    type Record = region::Model;

    fn insert_row(form: &RegionForm, actor: &Actor) -> Value {
        let mut row = Self::update_patch(form);
        row["created_by"] = json!(actor.id());
        row
    }
}
