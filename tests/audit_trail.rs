mod common;

use aidboard_server::audit::StoreAuditRecorder;
use aidboard_server::entities::{ActionKind, Role};
use aidboard_server::managers::assistance_types::{AssistanceForm, AssistanceTypes};
use aidboard_server::managers::operation_logs::OperationLogs;
use aidboard_server::managers::users::{NewUserForm, Users};
use aidboard_server::managers::{Confirmation, DeleteOutcome, EntityManager};
use aidboard_server::store::MemoryStore;
use common::{seed_actor, FailingRecorder, FakeProvisioner};
use serde_json::json;
use std::sync::Arc;

fn assistance_form(name: &str) -> AssistanceForm {
    serde_json::from_value(json!({ "name": name, "type": "food" })).unwrap()
}

#[tokio::test]
async fn every_mutation_writes_one_log_row() {
    let store = Arc::new(MemoryStore::new());
    let admin = seed_actor(&store, Role::Admin);
    let types: EntityManager<AssistanceTypes> =
        EntityManager::new(store.clone(), Arc::new(StoreAuditRecorder::new(store.clone())));

    let created = types.create(&admin, assistance_form("Food basket")).await.unwrap();
    assert_eq!(store.rows("operation_logs").len(), 1);

    types
        .update(&admin, created.id, assistance_form("Monthly food basket"))
        .await
        .unwrap();
    assert_eq!(store.rows("operation_logs").len(), 2);

    types
        .delete(&admin, created.id, Confirmation::Confirmed)
        .await
        .unwrap();
    let logs = store.rows("operation_logs");
    assert_eq!(logs.len(), 3);

    let delete = &logs[2];
    assert_eq!(delete["action_kind"], "delete");
    assert_eq!(delete["table_name"], "assistances");
    assert_eq!(delete["record_id"], created.id.to_string());
    assert_eq!(delete["user_id"], json!(admin.id()));
    assert!(delete["details"].is_null());

    let update = &logs[1];
    assert_eq!(update["details"]["name"], "Monthly food basket");
}

#[tokio::test]
async fn failed_audit_write_keeps_the_mutation() {
    let store = Arc::new(MemoryStore::new());
    let admin = seed_actor(&store, Role::Admin);
    let types: EntityManager<AssistanceTypes> =
        EntityManager::new(store.clone(), Arc::new(FailingRecorder));

    let created = types.create(&admin, assistance_form("Blankets")).await.unwrap();
    assert_eq!(store.rows("assistances").len(), 1);
    assert_eq!(store.rows("assistances")[0]["id"], created.id.to_string());

    types
        .update(&admin, created.id, assistance_form("Winter blankets"))
        .await
        .unwrap();
    assert_eq!(store.rows("assistances")[0]["name"], "Winter blankets");

    let outcome = types
        .delete(&admin, created.id, Confirmation::Confirmed)
        .await
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(store.rows("assistances").is_empty());

    assert!(store.rows("operation_logs").is_empty());
}

#[tokio::test]
async fn provisioned_user_is_audited_without_password() {
    let store = Arc::new(MemoryStore::new());
    let admin = seed_actor(&store, Role::Admin);
    let provisioner = FakeProvisioner::default();
    let users: EntityManager<Users> =
        EntityManager::new(store.clone(), Arc::new(StoreAuditRecorder::new(store.clone())));

    let form: NewUserForm = serde_json::from_value(json!({
        "email": "new@example.org",
        "password": "s3cret-pass",
        "full_name": "New Employee",
        "role": "employee",
    }))
    .unwrap();
    let identity = users.provision(&admin, &provisioner, form).await.unwrap();

    assert_eq!(provisioner.requests.lock().unwrap().len(), 1);
    let logs = store.rows("operation_logs");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["record_id"], identity.id.to_string());
    assert_eq!(
        logs[0]["details"],
        json!({ "email": "new@example.org", "role": "employee" })
    );
}

#[tokio::test]
async fn log_viewer_filters_by_kind() {
    let store = Arc::new(MemoryStore::new());
    let admin = seed_actor(&store, Role::Admin);
    let recorder = Arc::new(StoreAuditRecorder::new(store.clone()));
    let types: EntityManager<AssistanceTypes> = EntityManager::new(store.clone(), recorder.clone());
    let logs: EntityManager<OperationLogs> = EntityManager::new(store.clone(), recorder);

    let created = types.create(&admin, assistance_form("Rice")).await.unwrap();
    types
        .delete(&admin, created.id, Confirmation::Confirmed)
        .await
        .unwrap();

    let deletes = logs.recent(&admin, Some(ActionKind::Delete), None).await.unwrap();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].tone, "red");
    assert_eq!(
        deletes[0].row.profiles.as_ref().map(|p| p.full_name.as_str()),
        Some(admin.profile.full_name.as_str())
    );

    let all = logs.recent(&admin, None, None).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn manager_cannot_read_the_log() {
    let store = Arc::new(MemoryStore::new());
    let manager = seed_actor(&store, Role::Manager);
    let logs: EntityManager<OperationLogs> =
        EntityManager::new(store.clone(), Arc::new(StoreAuditRecorder::new(store.clone())));

    assert!(logs.recent(&manager, None, None).await.is_err());
}
