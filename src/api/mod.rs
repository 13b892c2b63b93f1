pub mod auth;
pub mod entities;
pub mod middleware;
pub mod users;
pub mod views;

use crate::audit::AuditRecorder;
use crate::auth::AuthContext;
use crate::functions::UserProvisioner;
use crate::managers::assistance_types::AssistanceTypes;
use crate::managers::deliveries::Deliveries;
use crate::managers::families::Families;
use crate::managers::inventory::Inventory;
use crate::managers::lookups::Lookups;
use crate::managers::regions::Regions;
use crate::managers::tasks::Tasks;
use crate::managers::users::Users;
use crate::managers::{EntityManager, Resource};
use crate::reports::Reports;
use crate::store::RowStore;
use axum::{
    routing::{get, patch, post},
    Extension, Router,
};
use std::sync::Arc;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "aidboard_session";

/// Shared handles for every handler.
#[derive(Clone)]
pub struct AppContext {
    pub auth: AuthContext,
    pub store: Arc<dyn RowStore>,
    pub audit: Arc<dyn AuditRecorder>,
    pub provisioner: Arc<dyn UserProvisioner>,
}

impl AppContext {
    pub fn manager<R: Resource>(&self) -> EntityManager<R> {
        EntityManager::new(self.store.clone(), self.audit.clone())
    }

    pub fn lookups(&self) -> Lookups {
        Lookups::new(self.store.clone())
    }

    pub fn reports(&self) -> Reports {
        Reports::new(self.store.clone())
    }
}

async fn health_check() -> &'static str {
    "OK"
}

/// API routes with session handling. Tracing, CORS and metrics layers are
/// added by the server binary.
pub fn router(ctx: AppContext) -> Router {
    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let protected_routes = Router::new()
        .route("/auth/session", get(auth::session))
        .route("/dashboard/overview", get(views::overview))
        .route("/reports", get(views::report))
        .route("/operation-logs", get(views::operation_logs))
        .route("/lookups/regions", get(views::region_choices))
        .route("/lookups/assistance-types", get(views::assistance_choices))
        .route("/lookups/employees", get(views::employee_choices))
        .route("/users", get(entities::list::<Users>).post(users::create))
        .route(
            "/users/:id",
            patch(entities::update::<Users>).delete(entities::delete::<Users>),
        )
        .route(
            "/regions",
            get(entities::list::<Regions>).post(entities::create::<Regions>),
        )
        .route(
            "/regions/:id",
            patch(entities::update::<Regions>).delete(entities::delete::<Regions>),
        )
        .route(
            "/families",
            get(entities::list::<Families>).post(entities::create::<Families>),
        )
        .route(
            "/families/:id",
            patch(entities::update::<Families>).delete(entities::delete::<Families>),
        )
        .route(
            "/assistance-types",
            get(entities::list::<AssistanceTypes>).post(entities::create::<AssistanceTypes>),
        )
        .route(
            "/assistance-types/:id",
            patch(entities::update::<AssistanceTypes>).delete(entities::delete::<AssistanceTypes>),
        )
        .route(
            "/inventory",
            get(entities::list::<Inventory>).post(entities::create::<Inventory>),
        )
        .route(
            "/inventory/:id",
            patch(entities::update::<Inventory>).delete(entities::delete::<Inventory>),
        )
        .route(
            "/tasks",
            get(entities::list::<Tasks>).post(entities::create::<Tasks>),
        )
        .route(
            "/tasks/:id",
            patch(entities::update::<Tasks>).delete(entities::delete::<Tasks>),
        )
        .route("/tasks/:id/status", patch(entities::update_status::<Tasks>))
        .route("/deliveries", get(entities::list::<Deliveries>))
        .route(
            "/deliveries/:id/status",
            patch(entities::update_status::<Deliveries>),
        )
        .route_layer(axum::middleware::from_fn(middleware::session_middleware));

    Router::new()
        .route("/health", get(health_check))
        .merge(auth_routes)
        .merge(protected_routes)
        .layer(Extension(ctx))
        .layer(tower_cookies::CookieManagerLayer::new())
}
