use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::error;

use models::todo::{NewTodo, Todo, TodoPatch};
use service::errors::ServiceError;
use service::file::TodoStore;

use crate::errors::JsonApiError;

#[derive(Serialize)]
pub struct CreatedTodo {
    pub id: String,
}

/// List the whole collection.
pub async fn list(State(store): State<Arc<TodoStore>>) -> Result<Json<Vec<Todo>>, JsonApiError> {
    store.list().await.map(Json).map_err(|e| {
        error!(err = %e, "list todos failed");
        JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string()))
    })
}

/// Fetch one todo by id.
pub async fn get_one(
    State(store): State<Arc<TodoStore>>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, JsonApiError> {
    store.get(&id).await.map(Json).map_err(|e| match e {
        ServiceError::NotFound(_) => {
            JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(e.to_string()))
        }
        _ => {
            error!(err = %e, "get todo failed");
            JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string()))
        }
    })
}

/// Create a todo; responds 201 with the assigned id.
pub async fn create(
    State(store): State<Arc<TodoStore>>,
    Json(input): Json<NewTodo>,
) -> Result<(StatusCode, Json<CreatedTodo>), JsonApiError> {
    match store.create(input).await {
        Ok(todo) => Ok((StatusCode::CREATED, Json(CreatedTodo { id: todo.id }))),
        Err(e @ ServiceError::Model(_)) => Err(JsonApiError::new(
            StatusCode::BAD_REQUEST,
            "Validation Error",
            Some(e.to_string()),
        )),
        Err(e) => {
            error!(err = %e, "create todo failed");
            Err(JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string())))
        }
    }
}

/// Apply a partial update to one todo.
pub async fn update(
    State(store): State<Arc<TodoStore>>,
    Path(id): Path<String>,
    Json(patch): Json<TodoPatch>,
) -> Result<Json<Todo>, JsonApiError> {
    store.update(&id, patch).await.map(Json).map_err(|e| match e {
        ServiceError::NotFound(_) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", None),
        _ => {
            error!(err = %e, "update todo failed");
            JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string()))
        }
    })
}

/// Delete one todo; responds 200 with an empty body.
pub async fn delete(
    State(store): State<Arc<TodoStore>>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    match store.delete(&id).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(ServiceError::NotFound(_)) => {
            Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", None))
        }
        Err(e) => {
            error!(err = %e, "delete todo failed");
            Err(JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string())))
        }
    }
}
