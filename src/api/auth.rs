use super::{AppContext, SESSION_COOKIE};
use crate::auth::Session;
use crate::entities::{Profile, Role};
use crate::error::AppError;
use crate::locale;
use crate::policy::{self, View};
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
    /// The account type picked on the login screen.
    #[serde(default)]
    role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct MenuItem {
    pub view: View,
    pub label: &'static str,
}

pub fn menu(role: Role) -> Vec<MenuItem> {
    policy::views(role)
        .into_iter()
        .map(|view| MenuItem {
            view,
            label: locale::view_label(view),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub email: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub profile: Profile,
    pub role_label: &'static str,
    pub menu: Vec<MenuItem>,
}

impl SessionView {
    fn new(session: &Session, profile: Profile) -> Self {
        Self {
            email: session.email.clone(),
            expires_at: session.expires_at,
            role_label: locale::role_label(profile.role),
            menu: menu(profile.role),
            profile,
        }
    }
}

fn session_cookie(value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

pub async fn login(
    Extension(ctx): Extension<AppContext>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionView>, AppError> {
    tracing::Span::current()
        .record("table", "profiles")
        .record("user_email", payload.email.as_str());

    let session = match ctx
        .auth
        .authenticate(payload.email.trim(), &payload.password, payload.role)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            tracing::Span::current()
                .record("action", "login_failed")
                .record("error", e.outcome());
            return Err(e.into());
        }
    };
    let profile = session
        .profile
        .clone()
        .ok_or_else(|| AppError::Internal("authenticated session has no profile".into()))?;

    cookies.add(session_cookie(session.id.to_string()));

    tracing::Span::current()
        .record("action", "login")
        .record("user_id", tracing::field::display(profile.id))
        .record("business_event", "Operator signed in");

    Ok(Json(SessionView::new(&session, profile)))
}

pub async fn logout(
    Extension(ctx): Extension<AppContext>,
    cookies: Cookies,
) -> Result<StatusCode, AppError> {
    let session_id = cookies
        .get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse::<Uuid>().ok());
    if let Some(id) = session_id {
        ctx.auth.sign_out(id).await?;
    }
    cookies.remove(session_cookie(String::new()));
    tracing::Span::current().record("action", "logout");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn session(Extension(session): Extension<Session>) -> Result<Json<SessionView>, AppError> {
    let profile = session.profile.clone().ok_or(AppError::Unauthorized)?;
    Ok(Json(SessionView::new(&session, profile)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_is_labelled_per_view() {
        let items = menu(Role::Employee);
        let labels: Vec<_> = items.iter().map(|item| item.label).collect();
        assert_eq!(labels, vec!["مهامي", "تسليماتي"]);
    }
}
