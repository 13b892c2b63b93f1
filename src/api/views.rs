//! Read-only views: statistics, reports, the operation log and form lookups.

use super::AppContext;
use crate::entities::ActionKind;
use crate::error::AppError;
use crate::managers::lookups::{AssistanceChoice, EmployeeChoice, RegionChoice};
use crate::managers::operation_logs::{LogView, OperationLogs};
use crate::managers::Actor;
use crate::reports::{Overview, Report};
use axum::extract::{Extension, Json, Query};
use serde::Deserialize;

pub async fn overview(
    Extension(ctx): Extension<AppContext>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Overview>, AppError> {
    Ok(Json(ctx.reports().overview(&actor).await?))
}

pub async fn report(
    Extension(ctx): Extension<AppContext>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Report>, AppError> {
    Ok(Json(ctx.reports().report(&actor).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct LogParams {
    #[serde(default)]
    pub kind: Option<ActionKind>,
    #[serde(default)]
    pub q: Option<String>,
}

pub async fn operation_logs(
    Extension(ctx): Extension<AppContext>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<LogParams>,
) -> Result<Json<Vec<LogView>>, AppError> {
    let entries = ctx
        .manager::<OperationLogs>()
        .recent(&actor, params.kind, params.q.as_deref())
        .await?;
    Ok(Json(entries))
}

pub async fn region_choices(
    Extension(ctx): Extension<AppContext>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<RegionChoice>>, AppError> {
    Ok(Json(ctx.lookups().regions(&actor).await?))
}

pub async fn assistance_choices(
    Extension(ctx): Extension<AppContext>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<AssistanceChoice>>, AppError> {
    Ok(Json(ctx.lookups().assistance_types(&actor).await?))
}

pub async fn employee_choices(
    Extension(ctx): Extension<AppContext>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<EmployeeChoice>>, AppError> {
    Ok(Json(ctx.lookups().employees(&actor).await?))
}
