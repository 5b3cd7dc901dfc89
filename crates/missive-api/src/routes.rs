use axum::{Json, Router, extract::State, routing::get};

use missive_types::api::HealthResponse;

use crate::error::ApiError;
use crate::messages;
use crate::state::{AppState, run_blocking};
use crate::users;

/// All resource routes with state attached. Transport layers (CORS, tracing)
/// are added by the binary.
pub fn router(state: AppState) -> Router {
    let message_routes = Router::new()
        .route("/", get(messages::list_messages).post(messages::create_message))
        .route(
            "/{message_id}",
            get(messages::get_message)
                .put(messages::update_message)
                .delete(messages::delete_message),
        );

    let user_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        );

    Router::new()
        .route("/health", get(health))
        .nest("/messages", message_routes)
        .nest("/users", user_routes)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    run_blocking(&state, |db| db.ping()).await?;
    Ok(Json(HealthResponse { status: "ok" }))
}
