use crate::error::Error;
use crate::state::session::{CurrentUser, SESSION_COOKIE};
use crate::state::{NestedRouter, SharedState};
use axum::extract::State;
use axum::response::Redirect;
use axum::routing::post;
use axum::Form;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogoutForm {
    #[serde(default)]
    pub csrfmiddlewaretoken: String,
}

pub fn route() -> NestedRouter {
    axum::Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

pub(super) async fn login(
    State(state): SharedState,
    jar: CookieJar,
    Form(login_credentials): Form<LoginCredentials>,
) -> Result<(CookieJar, Redirect), Error> {
    let auth = match crate::auth::Auth::validate(
        &state.store,
        &login_credentials.username,
        login_credentials.password,
    )
    .await?
    {
        Some(it) => it,
        None => {
            tracing::info!(username = %login_credentials.username, "rejected login");
            return Err(Error::Unauthorized);
        }
    };

    tracing::info!(username = %login_credentials.username, "logged in");
    let session_id = state
        .create_session(login_credentials.username, auth)
        .await;

    let next = login_credentials
        .next
        .filter(|next| is_local_path(next))
        .unwrap_or_else(|| String::from("/"));

    Ok((jar.add(state.session_cookie(session_id)), Redirect::to(&next)))
}

pub(super) async fn logout(
    State(state): SharedState,
    jar: CookieJar,
    Form(logout_form): Form<LogoutForm>,
) -> Result<(CookieJar, Redirect), Error> {
    if let CurrentUser::Authenticated {
        username,
        csrf_token,
    } = state.current_user(&jar).await
    {
        if logout_form.csrfmiddlewaretoken != csrf_token {
            tracing::warn!(%username, "logout rejected: CSRF token mismatch");
            return Err(Error::Forbidden);
        }
    }

    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.remove_session(&cookie.value().to_owned()).await;
    }

    Ok((
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to("/"),
    ))
}

/// Only redirect within this site
fn is_local_path(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//") && !next.starts_with("/\\")
}
