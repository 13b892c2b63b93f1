pub mod assistance;
pub mod delivery;
pub mod enums;
pub mod family;
pub mod inventory;
pub mod operation_log;
pub mod profile;
pub mod region;
pub mod task;

pub use enums::{
    ActionKind, AssistanceCategory, DeliveryStatus, InventoryStatus, Role, TaskPriority, TaskStatus,
    UnknownRole,
};

pub type Profile = profile::Model;
