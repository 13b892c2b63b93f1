mod common;

use aidboard_server::entities::Role;
use aidboard_server::functions::{self, FunctionState};
use aidboard_server::store::{MemoryStore, StoreOp};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common::{seed_profile, FakeAdmin, FakeGateway};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

const ANON: &str = "anon-key";
const SERVICE: &str = "service-key";

struct Function {
    app: Router,
    store: Arc<MemoryStore>,
    admin: Arc<FakeAdmin>,
}

fn function() -> Function {
    let store = Arc::new(MemoryStore::new());
    let admin = Arc::new(FakeAdmin::default());
    let state = FunctionState {
        gateway: Arc::new(FakeGateway::default()),
        admin: admin.clone(),
        store: store.clone(),
        service_token: SERVICE.into(),
        anon_key: ANON.into(),
    };
    Function {
        app: functions::router(state, None),
        store,
        admin,
    }
}

fn post(caller: Option<Uuid>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/functions/v1/create-user")
        .header("content-type", "application/json")
        .header("apikey", ANON);
    if let Some(id) = caller {
        builder = builder.header("authorization", format!("Bearer {}", FakeGateway::token_for(id)));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn new_user() -> Value {
    json!({
        "email": "worker@example.org",
        "password": "s3cret-pass",
        "full_name": "Field Worker",
        "role": "employee",
    })
}

#[tokio::test]
async fn preflight_is_accepted() {
    let f = function();
    let response = f
        .app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/functions/create-user")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_api_key_is_unauthorized() {
    let f = function();
    let admin = seed_profile(&f.store, Role::Admin);
    let mut request = post(Some(admin.id), new_user());
    request.headers_mut().remove("apikey");

    let response = f.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_bearer_is_unauthorized() {
    let f = function();
    let response = f.app.oneshot(post(None, new_user())).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_admin_caller_is_forbidden() {
    let f = function();
    let manager = seed_profile(&f.store, Role::Manager);

    let response = f.app.oneshot(post(Some(manager.id), new_user())).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(f.admin.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let f = function();
    let admin = seed_profile(&f.store, Role::Admin);

    let response = f
        .app
        .oneshot(post(
            Some(admin.id),
            json!({ "email": "worker@example.org", "password": "", "full_name": "X", "role": "employee" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
    assert_eq!(f.store.calls(StoreOp::Upsert, "profiles"), 0);
}

#[tokio::test]
async fn unknown_role_is_rejected() {
    let f = function();
    let admin = seed_profile(&f.store, Role::Admin);
    let mut body = new_user();
    body["role"] = json!("superuser");

    let response = f.app.oneshot(post(Some(admin.id), body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_surfaces_gateway_message() {
    let f = function();
    let admin = seed_profile(&f.store, Role::Admin);
    let mut body = new_user();
    body["email"] = json!("taken@example.org");

    let response = f.app.oneshot(post(Some(admin.id), body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json_body(response).await["error"].as_str().unwrap().to_string();
    assert!(error.contains("already been registered"));
}

#[tokio::test]
async fn admin_creates_confirmed_user_with_profile() {
    let f = function();
    let admin = seed_profile(&f.store, Role::Admin);

    let response = f.app.oneshot(post(Some(admin.id), new_user())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    let new_id = body["user"]["id"].as_str().unwrap().to_string();

    let created = f.admin.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert!(created[0].email_confirm);

    let profile = f
        .store
        .rows("profiles")
        .into_iter()
        .find(|row| row["id"] == new_id)
        .expect("profile upserted");
    assert_eq!(profile["full_name"], "Field Worker");
    assert_eq!(profile["role"], "employee");
    assert_eq!(profile["is_active"], true);
}
