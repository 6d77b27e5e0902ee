// Session endpoints: login, token check, logout

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AuthError;
use crate::core::state::AppState;
use crate::models::account::{LoginRequest, SessionResponse};
use crate::security::session::{clear_session, session_cookie, AuthenticatedUser};

/// POST /api/auth/login
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let user = state.accounts.login(request).await?;
    let token = state.tokens.issue(user.id)?;

    let jar = jar.add(session_cookie(token, state.config.secure_cookies()));
    Ok((jar, Json(SessionResponse { user_id: user.id })).into_response())
}

/// GET /api/auth/validate-token
///
/// Only reachable through the session gate, so all that is left is echoing the
/// subject back.
pub async fn validate_token_handler(Extension(user): Extension<AuthenticatedUser>) -> Json<SessionResponse> {
    Json(SessionResponse { user_id: user.user_id })
}

/// POST /api/auth/logout
///
/// Always succeeds, with or without a session.
pub async fn logout_handler(jar: CookieJar) -> impl IntoResponse {
    debug!("Clearing session cookie");
    (clear_session(jar), StatusCode::OK)
}
