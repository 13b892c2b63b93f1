//! Access Policy: which views a role sees and which mutations it may attempt.
//!
//! The row store's own row-level security remains the last line of defence.
//! These checks run in every handler regardless of what the menu showed.

use crate::entities::Role;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    Users,
    Regions,
    Families,
    AssistanceTypes,
    Inventory,
    Tasks,
    Reports,
    OperationLogs,
    MyTasks,
    MyDeliveries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Users,
    Regions,
    Families,
    AssistanceTypes,
    Inventory,
    Tasks,
    Deliveries,
    OperationLogs,
}

impl EntityKind {
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Users => "profiles",
            EntityKind::Regions => "regions",
            EntityKind::Families => "families",
            EntityKind::AssistanceTypes => "assistances",
            EntityKind::Inventory => "inventory",
            EntityKind::Tasks => "tasks",
            EntityKind::Deliveries => "deliveries",
            EntityKind::OperationLogs => "operation_logs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
    /// Status (and notes) change on an assigned task or delivery.
    UpdateStatus,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::UpdateStatus => "update status of",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    /// Only rows assigned to the caller.
    Own,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Entity(EntityKind, Operation),
    View(View),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{role} is not permitted to {}", describe(.target))]
pub struct AccessDenied {
    pub role: Role,
    pub target: Target,
}

fn describe(target: &Target) -> String {
    match target {
        Target::Entity(entity, op) => format!("{op} {}", entity.table()),
        Target::View(view) => format!("open {view:?}"),
    }
}

pub fn views(role: Role) -> BTreeSet<View> {
    use View::*;
    let views: &[View] = match role {
        Role::Admin => &[
            Users,
            Regions,
            Families,
            AssistanceTypes,
            Inventory,
            Tasks,
            Reports,
            OperationLogs,
        ],
        Role::Manager => &[Families, AssistanceTypes, Inventory, Tasks, Reports],
        Role::Employee => &[MyTasks, MyDeliveries],
    };
    views.iter().copied().collect()
}

const ADMIN_WRITES: [EntityKind; 6] = [
    EntityKind::Users,
    EntityKind::Regions,
    EntityKind::AssistanceTypes,
    EntityKind::Families,
    EntityKind::Inventory,
    EntityKind::Tasks,
];

const MANAGER_WRITES: [EntityKind; 4] = [
    EntityKind::Families,
    EntityKind::AssistanceTypes,
    EntityKind::Inventory,
    EntityKind::Tasks,
];

pub fn grant(role: Role, entity: EntityKind, op: Operation) -> Option<Scope> {
    use Operation::*;
    match (role, op) {
        (Role::Admin, Read) => Some(Scope::All),
        (Role::Admin, Create | Update | Delete) if ADMIN_WRITES.contains(&entity) => Some(Scope::All),
        (Role::Admin, UpdateStatus) if entity == EntityKind::Tasks => Some(Scope::All),

        (Role::Manager, Read) if MANAGER_WRITES.contains(&entity) => Some(Scope::All),
        (Role::Manager, Create | Update | Delete) if MANAGER_WRITES.contains(&entity) => {
            Some(Scope::All)
        }
        (Role::Manager, UpdateStatus) if entity == EntityKind::Tasks => Some(Scope::All),

        (Role::Employee, Read | UpdateStatus)
            if matches!(entity, EntityKind::Tasks | EntityKind::Deliveries) =>
        {
            Some(Scope::Own)
        }
        _ => None,
    }
}

pub fn authorize(role: Role, entity: EntityKind, op: Operation) -> Result<Scope, AccessDenied> {
    grant(role, entity, op).ok_or(AccessDenied {
        role,
        target: Target::Entity(entity, op),
    })
}

pub fn authorize_view(role: Role, view: View) -> Result<(), AccessDenied> {
    if views(role).contains(&view) {
        Ok(())
    } else {
        Err(AccessDenied {
            role,
            target: Target::View(view),
        })
    }
}
