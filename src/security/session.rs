// Session gate for cookie-authenticated routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::SessionRejection;
use crate::core::state::AppState;
use crate::models::user::UserId;
use crate::security::token::{TokenService, SESSION_LIFETIME_HOURS};

pub const SESSION_COOKIE: &str = "auth_token";

/// Request context injected by [`require_session`]. Handlers behind the gate take
/// it as `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Pure part of the gate: cookie jar in, authenticated subject or rejection out
pub fn authenticate(jar: &CookieJar, tokens: &TokenService) -> Result<AuthenticatedUser, SessionRejection> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .ok_or(SessionRejection::MissingCookie)?;

    let user_id = tokens
        .verify(token)
        .map_err(|_| SessionRejection::InvalidToken)?;

    Ok(AuthenticatedUser { user_id })
}

pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, SessionRejection> {
    let user = authenticate(&jar, &state.tokens).inspect_err(|rejection| {
        debug!(reason = %rejection, path = %request.uri().path(), "Session rejected");
        state.metrics.increment_rejected_sessions();
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// The cookie handed out on login and registration
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .max_age(time::Duration::hours(SESSION_LIFETIME_HOURS))
        .build()
}

/// An already-expired `auth_token` cookie that makes the browser drop its copy
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .build()
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.add(expired_session_cookie())
}
