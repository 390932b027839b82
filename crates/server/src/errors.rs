use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// JSON error payload returned by the API: a terse title plus an
/// optional detail. Internal error text never leaks beyond the detail
/// string the handler chooses to expose.
#[derive(Debug)]
pub struct JsonApiError {
    status: StatusCode,
    title: &'static str,
    detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = match self.detail {
            Some(detail) => serde_json::json!({"error": self.title, "detail": detail}),
            None => serde_json::json!({"error": self.title}),
        };
        (self.status, Json(body)).into_response()
    }
}
