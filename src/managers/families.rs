use super::validation::{at_least, optional, required};
use super::{Actor, Creatable, Editable, Resource, Validate, ValidationError};
use crate::entities::family;
use crate::policy::EntityKind;
use crate::search::Searchable;
use crate::store::{Expand, Query};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;
use uuid::Uuid;

pub struct Families;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionName {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyRow {
    #[serde(flatten)]
    pub family: family::Model,
    #[serde(default)]
    pub regions: Option<RegionName>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyForm {
    pub family_name: String,
    pub head_of_family: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub region_id: Option<Uuid>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub location_link: Option<String>,
    pub family_size: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for FamilyForm {
    fn validate(&self) -> Result<(), ValidationError> {
        required("family_name", &self.family_name)?;
        required("head_of_family", &self.head_of_family)?;
        at_least("family_size", self.family_size.into(), 1)
    }
}

impl Searchable for FamilyRow {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.family.family_name.as_str()),
            Cow::Borrowed(self.family.head_of_family.as_str()),
        ];
        fields.extend(self.family.phone.as_deref().map(Cow::Borrowed));
        fields.extend(self.regions.as_ref().map(|r| Cow::Borrowed(r.name.as_str())));
        fields
    }
}

impl Resource for Families {
    const ENTITY: EntityKind = EntityKind::Families;
    type Row = FamilyRow;

    fn list_query() -> Query {
        Query::table(Self::ENTITY.table())
            .expand(Expand::new("regions", "regions", "region_id").columns(["name"]))
            .order_desc("created_at")
    }
}

impl Editable for Families {
    type Form = FamilyForm;

    fn update_patch(form: &FamilyForm) -> Value {
        json!({
            "family_name": form.family_name.trim(),
            "head_of_family": form.head_of_family.trim(),
            "phone": optional(&form.phone),
            "region_id": form.region_id,
            "address": optional(&form.address),
            "location_link": optional(&form.location_link),
            "family_size": form.family_size,
            "notes": optional(&form.notes),
        })
    }
}

impl Creatable for Families {
    type Record = family::Model;

    fn insert_row(form: &FamilyForm, actor: &Actor) -> Value {
        let mut row = Self::update_patch(form);
        row["created_by"] = json!(actor.id());
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(size: i32) -> FamilyForm {
        FamilyForm {
            family_name: "Al-Masri".into(),
            head_of_family: "Khaled".into(),
            phone: Some("".into()),
            region_id: None,
            address: None,
            location_link: None,
            family_size: size,
            notes: None,
        }
    }

    #[test]
    fn size_must_be_positive() {
        assert!(form(1).validate().is_ok());
        assert!(matches!(
            form(0).validate(),
            Err(ValidationError::BelowMinimum { field: "family_size", .. })
        ));
    }

    #[test]
    fn blank_optionals_become_null() {
        let patch = Families::update_patch(&form(4));
        assert!(patch["phone"].is_null());
        assert_eq!(patch["family_size"], 4);
    }
}
