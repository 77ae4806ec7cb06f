use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bbbstat_core::DashboardError;
use serde_json::json;

pub struct ApiError {
    error: DashboardError,
    debug: bool,
}

impl ApiError {
    pub fn new(error: DashboardError, debug: bool) -> Self {
        Self { error, debug }
    }

    pub fn status(&self) -> StatusCode {
        if self.error.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_client_error() || self.debug {
            self.error.to_string()
        } else {
            tracing::error!("request failed: {}", self.error);
            "internal server error".to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
