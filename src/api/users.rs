use super::AppContext;
use crate::error::AppError;
use crate::functions::ProvisionResponse;
use crate::managers::users::{NewUserForm, Users};
use crate::managers::Actor;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
};

pub async fn create(
    Extension(ctx): Extension<AppContext>,
    Extension(actor): Extension<Actor>,
    Json(form): Json<NewUserForm>,
) -> Result<(StatusCode, Json<ProvisionResponse>), AppError> {
    let user = ctx
        .manager::<Users>()
        .provision(&actor, ctx.provisioner.as_ref(), form)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ProvisionResponse {
            success: true,
            user,
        }),
    ))
}
