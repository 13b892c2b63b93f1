//! Closed vocabularies stored as text columns.
//!
//! Rows written by this service always carry the machine tag (`string_value`).
//! Older rows may still hold the operator-language labels the dashboard used
//! to write directly; serde aliases keep those readable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "employee")]
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[sea_orm(string_value = "new")]
    #[serde(alias = "pending", alias = "جديدة")]
    New,
    #[sea_orm(string_value = "in_progress")]
    #[serde(alias = "in-progress", alias = "قيد التنفيذ")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    #[serde(alias = "مكتملة")]
    Completed,
    #[sea_orm(string_value = "other")]
    #[serde(other)]
    Other,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    #[sea_orm(string_value = "low")]
    #[serde(alias = "منخفضة")]
    Low,
    #[default]
    #[sea_orm(string_value = "medium")]
    #[serde(alias = "متوسطة")]
    Medium,
    #[sea_orm(string_value = "high")]
    #[serde(alias = "عالية")]
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[sea_orm(string_value = "not_delivered")]
    #[serde(alias = "لم يتم")]
    NotDelivered,
    #[sea_orm(string_value = "in_transit")]
    #[serde(alias = "في الطريق")]
    InTransit,
    #[sea_orm(string_value = "delivered")]
    #[serde(alias = "تم التسليم")]
    Delivered,
    #[sea_orm(string_value = "other")]
    #[serde(other)]
    Other,
}

/// Any status outside the two known ones decodes as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    #[sea_orm(string_value = "available")]
    #[serde(alias = "متوفر")]
    Available,
    #[sea_orm(string_value = "assigned")]
    #[serde(alias = "مخصص")]
    Assigned,
    #[sea_orm(string_value = "other")]
    #[serde(other)]
    Other,
}

impl InventoryStatus {
    /// Stored labels that decode to `Available` or `Assigned`.
    pub const DERIVED_LABELS: [&'static str; 4] = ["available", "assigned", "متوفر", "مخصص"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AssistanceCategory {
    #[sea_orm(string_value = "food")]
    #[serde(alias = "غذائية")]
    Food,
    #[sea_orm(string_value = "financial")]
    #[serde(alias = "مالية")]
    Financial,
    #[sea_orm(string_value = "medical")]
    #[serde(alias = "طبية")]
    Medical,
    #[sea_orm(string_value = "educational")]
    #[serde(alias = "تعليمية")]
    Educational,
    #[sea_orm(string_value = "other")]
    #[serde(other)]
    Other,
}

/// Machine-readable kind stored next to every audit label.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[sea_orm(string_value = "create")]
    Create,
    #[sea_orm(string_value = "update")]
    Update,
    #[sea_orm(string_value = "delete")]
    Delete,
    #[default]
    #[sea_orm(string_value = "other")]
    #[serde(other)]
    Other,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Update => "update",
            ActionKind::Delete => "delete",
            ActionKind::Other => "other",
        }
    }

    /// Color tag used by the log viewer.
    pub fn tone(&self) -> &'static str {
        match self {
            ActionKind::Create => "green",
            ActionKind::Update => "blue",
            ActionKind::Delete => "red",
            ActionKind::Other => "neutral",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
