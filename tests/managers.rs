mod common;

use aidboard_server::audit::StoreAuditRecorder;
use aidboard_server::entities::{DeliveryStatus, Role, TaskStatus};
use aidboard_server::error::AppError;
use aidboard_server::managers::deliveries::Deliveries;
use aidboard_server::managers::families::{FamilyForm, Families};
use aidboard_server::managers::inventory::{Inventory, InventoryForm};
use aidboard_server::managers::regions::{RegionForm, Regions};
use aidboard_server::managers::tasks::{TaskForm, Tasks};
use aidboard_server::managers::users::{UserForm, Users};
use aidboard_server::managers::{
    Confirmation, DeleteOutcome, EntityManager, Resource, StatusChange, ValidationError,
};
use aidboard_server::store::{MemoryStore, StoreOp};
use common::{seed_actor, seed_profile, actor_for};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

fn manager<R: Resource>(store: &Arc<MemoryStore>) -> EntityManager<R> {
    EntityManager::new(store.clone(), Arc::new(StoreAuditRecorder::new(store.clone())))
}

fn family_form(name: &str, size: i32) -> FamilyForm {
    FamilyForm {
        family_name: name.into(),
        head_of_family: "Head".into(),
        phone: None,
        region_id: None,
        address: None,
        location_link: None,
        family_size: size,
        notes: None,
    }
}

fn task_form(title: &str, assignee: Uuid) -> TaskForm {
    TaskForm {
        title: title.into(),
        description: None,
        assigned_to: assignee,
        priority: Default::default(),
        due_date: None,
    }
}

#[tokio::test]
async fn invalid_family_size_never_reaches_the_store() {
    let store = Arc::new(MemoryStore::new());
    let admin = seed_actor(&store, Role::Admin);

    let err = manager::<Families>(&store)
        .create(&admin, family_form("Haddad", 0))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::BelowMinimum { field: "family_size", .. })
    ));
    assert_eq!(store.calls(StoreOp::Insert, "families"), 0);
    assert!(store.rows("operation_logs").is_empty());
}

#[tokio::test]
async fn created_family_appears_in_search() {
    let store = Arc::new(MemoryStore::new());
    let manager_actor = seed_actor(&store, Role::Manager);
    let families = manager::<Families>(&store);

    families.create(&manager_actor, family_form("Haddad", 4)).await.unwrap();
    families.create(&manager_actor, family_form("Nasser", 2)).await.unwrap();

    let found = families.list(&manager_actor, Vec::new(), Some("hadd")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].family.family_name, "Haddad");
    assert_eq!(found[0].family.family_size, 4);
}

#[tokio::test]
async fn cancelled_delete_leaves_rows_untouched() {
    let store = Arc::new(MemoryStore::new());
    let admin = seed_actor(&store, Role::Admin);
    let regions = manager::<Regions>(&store);

    let region = regions
        .create(
            &admin,
            RegionForm {
                name: "North".into(),
                description: None,
            },
        )
        .await
        .unwrap();

    let outcome = regions
        .delete(&admin, region.id, Confirmation::Cancelled)
        .await
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert_eq!(store.calls(StoreOp::Delete, "regions"), 0);
    assert_eq!(regions.list(&admin, Vec::new(), None).await.unwrap().len(), 1);

    let outcome = regions
        .delete(&admin, region.id, Confirmation::Confirmed)
        .await
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(regions.list(&admin, Vec::new(), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_missing_row_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let admin = seed_actor(&store, Role::Admin);

    let err = manager::<Regions>(&store)
        .delete(&admin, Uuid::new_v4(), Confirmation::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn employee_cannot_touch_regions_or_users() {
    let store = Arc::new(MemoryStore::new());
    let employee = seed_actor(&store, Role::Employee);

    let err = manager::<Regions>(&store)
        .create(
            &employee,
            RegionForm {
                name: "South".into(),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = manager::<Users>(&store)
        .update(
            &employee,
            employee.id(),
            UserForm {
                full_name: "Promoted".into(),
                phone: None,
                region_id: None,
                is_active: true,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    assert_eq!(store.calls(StoreOp::Insert, "regions"), 0);
    assert_eq!(store.calls(StoreOp::Update, "profiles"), 0);
}

#[tokio::test]
async fn manager_cannot_administer_users() {
    let store = Arc::new(MemoryStore::new());
    let manager_actor = seed_actor(&store, Role::Manager);

    let err = manager::<Users>(&store)
        .list(&manager_actor, Vec::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn employee_sees_only_assigned_tasks() {
    let store = Arc::new(MemoryStore::new());
    let admin = seed_actor(&store, Role::Admin);
    let mine = seed_profile(&store, Role::Employee);
    let theirs = seed_profile(&store, Role::Employee);
    let tasks = manager::<Tasks>(&store);

    tasks.create(&admin, task_form("Visit family", mine.id)).await.unwrap();
    tasks.create(&admin, task_form("Count stock", theirs.id)).await.unwrap();

    let visible = tasks.list(&actor_for(&mine), Vec::new(), None).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].task.title, "Visit family");
    assert_eq!(visible[0].task.status, TaskStatus::New);
    assert_eq!(
        visible[0].profiles.as_ref().map(|p| p.full_name.as_str()),
        Some(mine.full_name.as_str())
    );
}

#[tokio::test]
async fn employee_status_change_is_limited_to_own_rows() {
    let store = Arc::new(MemoryStore::new());
    let admin = seed_actor(&store, Role::Admin);
    let mine = seed_profile(&store, Role::Employee);
    let theirs = seed_profile(&store, Role::Employee);
    let tasks = manager::<Tasks>(&store);

    let own = tasks.create(&admin, task_form("Visit", mine.id)).await.unwrap();
    let other = tasks.create(&admin, task_form("Count", theirs.id)).await.unwrap();
    let me = actor_for(&mine);

    tasks
        .update_status(
            &me,
            own.id,
            StatusChange {
                status: TaskStatus::InProgress,
                notes: None,
            },
        )
        .await
        .unwrap();

    let err = tasks
        .update_status(
            &me,
            other.id,
            StatusChange {
                status: TaskStatus::Completed,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let statuses: Vec<_> = store
        .rows("tasks")
        .into_iter()
        .map(|row| (row["title"].as_str().unwrap().to_string(), row["status"].clone()))
        .collect();
    assert!(statuses.contains(&("Visit".to_string(), json!("in_progress"))));
    assert!(statuses.contains(&("Count".to_string(), json!("new"))));
}

#[tokio::test]
async fn delivered_status_stamps_delivery_time() {
    let store = Arc::new(MemoryStore::new());
    let employee = seed_profile(&store, Role::Employee);
    let delivery = store.seed(
        "deliveries",
        json!({
            "family_id": Uuid::new_v4(),
            "inventory_id": Uuid::new_v4(),
            "employee_id": employee.id,
            "quantity": 1,
            "status": "not_delivered",
            "scheduled_date": "2026-02-01",
        }),
    );
    let id: Uuid = delivery["id"].as_str().unwrap().parse().unwrap();

    manager::<Deliveries>(&store)
        .update_status(
            &actor_for(&employee),
            id,
            StatusChange {
                status: DeliveryStatus::Delivered,
                notes: Some("  ".into()),
            },
        )
        .await
        .unwrap();

    let row = &store.rows("deliveries")[0];
    assert_eq!(row["status"], "delivered");
    assert!(row["delivered_at"].is_string());
    assert!(row.get("delivery_notes").is_none());
}

#[tokio::test]
async fn unknown_stored_statuses_still_list() {
    let store = Arc::new(MemoryStore::new());
    let admin = seed_actor(&store, Role::Admin);
    let employee = seed_profile(&store, Role::Employee);
    store.seed(
        "tasks",
        json!({
            "title": "Legacy task",
            "assigned_to": employee.id,
            "status": "cancelled",
            "priority": "medium",
        }),
    );
    let tasks = manager::<Tasks>(&store);
    tasks.create(&admin, task_form("Visit family", employee.id)).await.unwrap();

    let listed = tasks.list(&admin, Vec::new(), None).await.unwrap();
    let mut statuses: Vec<TaskStatus> = listed.iter().map(|row| row.task.status).collect();
    statuses.sort_by_key(|status| *status == TaskStatus::Other);
    assert_eq!(statuses, vec![TaskStatus::New, TaskStatus::Other]);

    store.seed(
        "deliveries",
        json!({
            "family_id": Uuid::new_v4(),
            "inventory_id": Uuid::new_v4(),
            "employee_id": employee.id,
            "quantity": 1,
            "status": "returned",
        }),
    );
    let deliveries = manager::<Deliveries>(&store)
        .list(&actor_for(&employee), Vec::new(), None)
        .await
        .unwrap();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].delivery.status, DeliveryStatus::Other);
}

#[tokio::test]
async fn unknown_status_cannot_be_set() {
    let store = Arc::new(MemoryStore::new());
    let admin = seed_actor(&store, Role::Admin);
    let employee = seed_profile(&store, Role::Employee);
    let tasks = manager::<Tasks>(&store);
    let task = tasks.create(&admin, task_form("Visit", employee.id)).await.unwrap();

    let change: StatusChange<TaskStatus> = serde_json::from_value(json!({ "status": "archived" })).unwrap();
    let err = tasks
        .update_status(&actor_for(&employee), task.id, change)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(ValidationError::UnknownStatus)));
    assert_eq!(store.calls(StoreOp::Update, "tasks"), 0);
    assert_eq!(store.rows("tasks")[0]["status"], "new");
}

#[tokio::test]
async fn inventory_edit_keeps_unknown_status() {
    let store = Arc::new(MemoryStore::new());
    let admin = seed_actor(&store, Role::Admin);
    let employee = seed_profile(&store, Role::Employee);
    let assistance_id = Uuid::new_v4();
    let damaged = store.seed(
        "inventory",
        json!({ "assistance_id": assistance_id, "quantity": 3, "status": "damaged" }),
    );
    let available = store.seed(
        "inventory",
        json!({ "assistance_id": assistance_id, "quantity": 3, "status": "available" }),
    );
    let id_of = |row: &serde_json::Value| -> Uuid { row["id"].as_str().unwrap().parse().unwrap() };
    let form = InventoryForm {
        assistance_id,
        quantity: 2,
        assigned_to: Some(employee.id),
        notes: None,
    };
    let inventory = manager::<Inventory>(&store);

    inventory.update(&admin, id_of(&damaged), form.clone()).await.unwrap();
    inventory.update(&admin, id_of(&available), form).await.unwrap();

    let rows = store.rows("inventory");
    let status_of = |id: Uuid| {
        rows.iter()
            .find(|row| row["id"] == id.to_string())
            .map(|row| row["status"].clone())
    };
    assert_eq!(status_of(id_of(&damaged)), Some(json!("damaged")));
    assert_eq!(status_of(id_of(&available)), Some(json!("assigned")));
    assert!(rows.iter().all(|row| row["quantity"] == 2));
}
