// HTTP routes configuration

use crate::core::state::AppState;
use crate::handlers::{auth, fallback, health, metrics, my_hotels, users};
use crate::security::session::require_session;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let session = || middleware::from_fn_with_state(Arc::clone(&state), require_session);

    let auth_routes = Router::new()
        .route("/validate-token", get(auth::validate_token_handler))
        .route_layer(session())
        .route("/login", post(auth::login_handler))
        .route("/logout", post(auth::logout_handler));

    let user_routes = Router::new()
        .route("/me", get(users::me_handler))
        .route_layer(session())
        .route("/register", post(users::register_handler));

    // every hotel route is behind the session gate
    let hotel_routes = Router::new()
        .route(
            "/",
            post(my_hotels::create_hotel_handler).get(my_hotels::list_hotels_handler),
        )
        .route(
            "/{hotel_id}",
            get(my_hotels::get_hotel_handler).put(my_hotels::update_hotel_handler),
        )
        .layer(DefaultBodyLimit::max(state.config.max_hotel_body_bytes()))
        .route_layer(session());

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/my-hotels", hotel_routes)
        // Operational endpoints
        .route("/health", get(health::health_handler))
        .route("/metrics", get(metrics::metrics_handler))
        // 404 fallback for all unmatched routes
        .fallback(fallback::fallback_handler)
        .with_state(state)
}
