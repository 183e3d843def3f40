use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod mylist;
pub mod profiles;
pub mod users;

use crate::middleware::{
    auth_middleware, make_span_with_request_id, request_id_middleware, VerifierState,
};
use crate::state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let verifier: VerifierState = state.verifier.clone();

    Router::new()
        .route("/health", get(health_check))
        // Accounts
        .route("/register", post(users::register))
        .route("/user/info", get(users::user_info))
        // Profiles
        .route("/profiles", get(profiles::list_profiles))
        .route("/profiles/create", post(profiles::create_profile))
        .route("/profiles/:profile_id/update", put(profiles::update_profile))
        .route(
            "/profiles/:profile_id/delete",
            delete(profiles::delete_profile),
        )
        // Watchlist
        .route("/mylist", get(mylist::get_list))
        .route("/mylist/add", post(mylist::add_to_list))
        .route("/mylist/remove/:item_id", delete(mylist::remove_from_list))
        // Layers wrap inside-out: auth runs after tracing, which runs
        // after the request id is assigned.
        .layer(middleware::from_fn_with_state(verifier, auth_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
