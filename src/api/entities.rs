//! Handlers shared by every managed table.

use super::AppContext;
use crate::error::AppError;
use crate::managers::{
    Actor, Creatable, DeleteOutcome, Editable, Resource, StatusChange, StatusTracked,
};
use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Local search term.
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

pub async fn list<R: Resource>(
    Extension(ctx): Extension<AppContext>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<R::Row>>, AppError> {
    let rows = ctx
        .manager::<R>()
        .list(&actor, Vec::new(), params.q.as_deref())
        .await?;
    Ok(Json(rows))
}

pub async fn create<R: Creatable>(
    Extension(ctx): Extension<AppContext>,
    Extension(actor): Extension<Actor>,
    Json(form): Json<R::Form>,
) -> Result<(StatusCode, Json<R::Record>), AppError> {
    let record = ctx.manager::<R>().create(&actor, form).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update<R: Editable>(
    Extension(ctx): Extension<AppContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(form): Json<R::Form>,
) -> Result<StatusCode, AppError> {
    ctx.manager::<R>().update(&actor, id, form).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Without `?confirm=true` nothing is deleted and 428 is returned.
pub async fn delete<R: Editable>(
    Extension(ctx): Extension<AppContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode, AppError> {
    match ctx
        .manager::<R>()
        .delete(&actor, id, params.confirm.into())
        .await?
    {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::Cancelled => Err(AppError::ConfirmationRequired),
    }
}

pub async fn update_status<R: StatusTracked>(
    Extension(ctx): Extension<AppContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(change): Json<StatusChange<R::Status>>,
) -> Result<StatusCode, AppError> {
    ctx.manager::<R>().update_status(&actor, id, change).await?;
    Ok(StatusCode::NO_CONTENT)
}
