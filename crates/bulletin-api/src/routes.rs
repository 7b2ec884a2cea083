use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, post, put},
};

use crate::diagnostics::timed;
use crate::messages;
use crate::state::AppState;

pub const MESSAGES_PATH: &str = "/api/v1/messages";

/// All public message routes plus `/health`.
///
/// Only get-one and create run inside the timing layer; list, update and
/// delete are left bare.
pub fn router(state: AppState) -> Router {
    let item_path = format!("{}/{{id}}", MESSAGES_PATH);

    let timed_routes = Router::new()
        .route(MESSAGES_PATH, post(messages::create_public_message))
        .route(&item_path, get(messages::get_public_message))
        .route_layer(middleware::from_fn_with_state(state.clone(), timed));

    let plain_routes = Router::new()
        .route(MESSAGES_PATH, get(messages::get_public_messages))
        .route(
            &item_path,
            put(messages::update_public_message).delete(messages::delete_public_message),
        );

    Router::new()
        .route("/health", get(health))
        .merge(timed_routes)
        .merge(plain_routes)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
