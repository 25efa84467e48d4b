use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all gateway endpoints.
pub fn build_router(state: AppState, allow_cors: bool) -> Router {
    let router = Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/v1/profiles", post(handler::create_profile_handler))
        .route(
            "/v1/profiles/:user_id",
            get(handler::get_profile_handler).delete(handler::delete_profile_handler),
        )
        .route(
            "/v1/profiles/:user_id/classes/:level",
            put(handler::update_class_handler),
        )
        .route("/v1/invoke", post(handler::invoke_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if allow_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
