use axum::{
    extract::{Extension, State},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::core::error::AuthError;
use crate::core::state::AppState;
use crate::models::account::{RegisterRequest, SessionResponse};
use crate::models::user::UserProfile;
use crate::security::session::{session_cookie, AuthenticatedUser};

/// POST /api/users/register
///
/// A successful registration signs the new user in straight away.
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, AuthError> {
    let user = state.accounts.register(request).await?;
    let token = state.tokens.issue(user.id)?;

    let jar = jar.add(session_cookie(token, state.config.secure_cookies()));
    Ok((jar, Json(SessionResponse { user_id: user.id })).into_response())
}

/// GET /api/users/me
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserProfile>, AuthError> {
    let user = state.accounts.profile(user.user_id)?;
    Ok(Json(UserProfile::from(user.as_ref())))
}
