use super::enums::InventoryStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub assistance_id: Uuid,
    pub quantity: i32,
    pub assigned_to: Option<Uuid>,
    pub status: InventoryStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assistance::Entity",
        from = "Column::AssistanceId",
        to = "super::assistance::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Assistance,
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::AssignedTo",
        to = "super::profile::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Assignee,
}

impl Related<super::assistance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assistance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
