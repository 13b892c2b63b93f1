//! Choice lists for form dropdowns.

use super::Actor;
use crate::entities::{AssistanceCategory, Role};
use crate::error::AppError;
use crate::policy::{self, AccessDenied, EntityKind, Operation, Target};
use crate::store::{select_as, Filter, Query, RowStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionChoice {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistanceChoice {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub category: AssistanceCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeChoice {
    pub id: Uuid,
    pub full_name: String,
}

#[derive(Clone)]
pub struct Lookups {
    store: Arc<dyn RowStore>,
}

/// A lookup is open to any role allowed to create one of the `forms`.
fn allowed_for(actor: &Actor, lookup: EntityKind, forms: &[EntityKind]) -> Result<(), AccessDenied> {
    if forms
        .iter()
        .any(|form| policy::grant(actor.role(), *form, Operation::Create).is_some())
    {
        Ok(())
    } else {
        Err(AccessDenied {
            role: actor.role(),
            target: Target::Entity(lookup, Operation::Read),
        })
    }
}

impl Lookups {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Family form region picker.
    pub async fn regions(&self, actor: &Actor) -> Result<Vec<RegionChoice>, AppError> {
        allowed_for(actor, EntityKind::Regions, &[EntityKind::Families])?;
        let query = Query::table(EntityKind::Regions.table())
            .columns(["id", "name"])
            .order_asc("name");
        Ok(select_as(self.store.as_ref(), &actor.access_token, &query).await?)
    }

    /// Inventory form assistance picker.
    pub async fn assistance_types(&self, actor: &Actor) -> Result<Vec<AssistanceChoice>, AppError> {
        allowed_for(actor, EntityKind::AssistanceTypes, &[EntityKind::Inventory])?;
        let query = Query::table(EntityKind::AssistanceTypes.table())
            .columns(["id", "name", "type"])
            .order_asc("name");
        Ok(select_as(self.store.as_ref(), &actor.access_token, &query).await?)
    }

    /// Active employees, for task and inventory assignment.
    pub async fn employees(&self, actor: &Actor) -> Result<Vec<EmployeeChoice>, AppError> {
        allowed_for(actor, EntityKind::Users, &[EntityKind::Tasks, EntityKind::Inventory])?;
        let query = Query::table(EntityKind::Users.table())
            .columns(["id", "full_name"])
            .filter(Filter::eq("role", Role::Employee.as_str()))
            .filter(Filter::eq("is_active", true))
            .order_asc("full_name");
        Ok(select_as(self.store.as_ref(), &actor.access_token, &query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::test_support::actor;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn employees_are_active_and_sorted() {
        let store = Arc::new(MemoryStore::new());
        store.seed("profiles", json!({"full_name": "Zaid", "role": "employee", "is_active": true}));
        store.seed("profiles", json!({"full_name": "Amal", "role": "employee", "is_active": true}));
        store.seed("profiles", json!({"full_name": "Basel", "role": "employee", "is_active": false}));
        store.seed("profiles", json!({"full_name": "Huda", "role": "manager", "is_active": true}));

        let lookups = Lookups::new(store);
        let names: Vec<String> = lookups
            .employees(&actor(Role::Manager))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.full_name)
            .collect();
        assert_eq!(names, vec!["Amal", "Zaid"]);
    }

    #[tokio::test]
    async fn employees_get_no_lookups() {
        let lookups = Lookups::new(Arc::new(MemoryStore::new()));
        let err = lookups.regions(&actor(Role::Employee)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
