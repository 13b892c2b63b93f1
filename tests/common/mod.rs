#![allow(dead_code)]

use aidboard_server::api::AppContext;
use aidboard_server::audit::{AuditEntry, AuditRecorder, StoreAuditRecorder};
use aidboard_server::auth::{AuthContext, MemorySessionStore};
use aidboard_server::entities::{Profile, Role};
use aidboard_server::functions::{ProvisionError, ProvisionRequest, UserProvisioner};
use aidboard_server::identity::{
    GatewaySession, Identity, IdentityAdmin, IdentityError, IdentityGateway, NewIdentity,
};
use aidboard_server::managers::Actor;
use aidboard_server::store::{MemoryStore, RowStore, StoreError, StoreOp};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const PASSWORD: &str = "correct horse";

/// Identity gateway backed by a fixed account list. Tokens are `token-<id>`.
#[derive(Default)]
pub struct FakeGateway {
    accounts: Mutex<HashMap<String, Uuid>>,
}

impl FakeGateway {
    pub fn with_account(self, email: &str, id: Uuid) -> Self {
        self.accounts.lock().unwrap().insert(email.to_string(), id);
        self
    }

    pub fn token_for(id: Uuid) -> String {
        format!("token-{id}")
    }
}

#[async_trait]
impl IdentityGateway for FakeGateway {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<GatewaySession, IdentityError> {
        let id = self.accounts.lock().unwrap().get(email).copied();
        match id {
            Some(id) if password == PASSWORD => Ok(GatewaySession {
                access_token: Self::token_for(id),
                refresh_token: "refresh".into(),
                expires_in: 3600,
                user: identity(id, email),
            }),
            _ => Err(IdentityError::Rejected {
                status: 400,
                message: "Invalid login credentials".into(),
            }),
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<Identity, IdentityError> {
        let id = access_token
            .strip_prefix("token-")
            .and_then(|raw| raw.parse::<Uuid>().ok())
            .ok_or(IdentityError::Rejected {
                status: 401,
                message: "invalid JWT".into(),
            })?;
        Ok(identity(id, "caller@example.org"))
    }
}

#[derive(Default)]
pub struct FakeAdmin {
    pub created: Mutex<Vec<NewIdentity>>,
}

#[async_trait]
impl IdentityAdmin for FakeAdmin {
    async fn create_user(&self, request: &NewIdentity) -> Result<Identity, IdentityError> {
        if request.email.starts_with("taken") {
            return Err(IdentityError::Rejected {
                status: 422,
                message: "A user with this email address has already been registered".into(),
            });
        }
        self.created.lock().unwrap().push(request.clone());
        Ok(identity(Uuid::new_v4(), &request.email))
    }
}

/// Provisioner that records requests and mints identities locally.
#[derive(Default)]
pub struct FakeProvisioner {
    pub requests: Mutex<Vec<ProvisionRequest>>,
}

#[async_trait]
impl UserProvisioner for FakeProvisioner {
    async fn create_user(
        &self,
        _access_token: &str,
        request: &ProvisionRequest,
    ) -> Result<Identity, ProvisionError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(identity(Uuid::new_v4(), &request.email))
    }
}

pub struct FailingRecorder;

#[async_trait]
impl AuditRecorder for FailingRecorder {
    async fn record(&self, _token: &str, entry: &AuditEntry) -> Result<(), StoreError> {
        Err(StoreError::Rejected {
            op: StoreOp::Insert,
            table: entry.table().to_string(),
            message: "permission denied".into(),
        })
    }
}

pub fn identity(id: Uuid, email: &str) -> Identity {
    serde_json::from_value(json!({ "id": id, "email": email })).unwrap()
}

pub fn seed_profile(store: &MemoryStore, role: Role) -> Profile {
    let id = Uuid::new_v4();
    let row = store.seed(
        "profiles",
        json!({
            "id": id,
            "full_name": format!("{role} {}", &id.to_string()[..8]),
            "role": role,
            "phone": null,
            "region_id": null,
            "is_active": true,
        }),
    );
    serde_json::from_value(row).unwrap()
}

pub fn actor_for(profile: &Profile) -> Actor {
    Actor::new(profile.clone(), FakeGateway::token_for(profile.id))
}

pub fn seed_actor(store: &MemoryStore, role: Role) -> Actor {
    actor_for(&seed_profile(store, role))
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub ctx: AppContext,
    pub provisioner: Arc<FakeProvisioner>,
}

pub fn harness(gateway: FakeGateway, store: Arc<MemoryStore>) -> Harness {
    let provisioner = Arc::new(FakeProvisioner::default());
    let rows: Arc<dyn RowStore> = store.clone();
    let ctx = AppContext {
        auth: AuthContext::new(
            Arc::new(gateway),
            rows.clone(),
            Arc::new(MemorySessionStore::new()),
            Duration::from_secs(600),
        ),
        audit: Arc::new(StoreAuditRecorder::new(rows.clone())),
        store: rows,
        provisioner: provisioner.clone(),
    };
    Harness {
        store,
        ctx,
        provisioner,
    }
}
