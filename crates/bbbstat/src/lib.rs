pub mod error;
pub mod report;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/healthz", get(routes::healthz))
        .route("/api/layout", get(routes::layout))
        .route("/api/summary", get(routes::summary))
        .route("/api/meeting-history", get(routes::meeting_history))
        .route("/api/table", post(routes::table))
        .route("/api/charts", post(routes::charts))
        .route("/api/styles", post(routes::styles))
        .route("/api/events", post(routes::events))
        .with_state(state)
}
