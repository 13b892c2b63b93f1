use super::{AppContext, SESSION_COOKIE};
use crate::error::AppError;
use crate::managers::Actor;
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;
use uuid::Uuid;

/// Resolves the session cookie into an [`Actor`]. Sessions that never passed
/// the role check are treated as signed out.
pub async fn session_middleware(
    Extension(ctx): Extension<AppContext>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session_id = cookies
        .get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse::<Uuid>().ok())
        .ok_or(AppError::Unauthorized)?;

    let session = ctx
        .auth
        .get_session(session_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let profile = session.profile.clone().ok_or(AppError::Unauthorized)?;

    tracing::Span::current()
        .record("user_id", tracing::field::display(profile.id))
        .record("role", profile.role.as_str());

    request
        .extensions_mut()
        .insert(Actor::new(profile, session.access_token.clone()));
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
