use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::file::TodoStore;

use crate::errors::JsonApiError;

pub mod todos;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Unmatched route or verb.
async fn not_found() -> JsonApiError {
    JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", None)
}

/// Build the full application router.
pub fn build_router(store: Arc<TodoStore>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/todos", get(todos::list).post(todos::create))
        .route(
            "/todos/:id",
            get(todos::get_one).put(todos::update).delete(todos::delete),
        )
        .fallback(not_found)
        .with_state(store)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
