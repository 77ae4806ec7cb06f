use std::collections::BTreeSet;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use bbbstat_core::dashboard::DashboardLayout;
use bbbstat_core::figure::Figure;
use bbbstat_core::reactive::{UiEvent, View};
use bbbstat_core::reconcile::BarChart;
use bbbstat_core::styles::StyleOverride;
use bbbstat_core::summary::SummaryCard;
use bbbstat_core::table::{TablePage, TableQuery};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../assets/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn healthz(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "records": state.dashboard().dataset().len(),
    }))
}

pub async fn layout(State(state): State<AppState>) -> Result<Json<DashboardLayout>, ApiError> {
    state
        .dashboard()
        .layout()
        .map(Json)
        .map_err(|err| state.reject(err))
}

pub async fn summary(State(state): State<AppState>) -> Json<Vec<SummaryCard>> {
    Json(state.dashboard().summary_cards())
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub month: Option<u32>,
}

pub async fn meeting_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Figure>, ApiError> {
    let dashboard = state.dashboard();
    let month = params.month.unwrap_or(dashboard.display().default_month);
    dashboard
        .meeting_history(month)
        .map(Json)
        .map_err(|err| state.reject(err))
}

pub async fn table(
    State(state): State<AppState>,
    Json(query): Json<TableQuery>,
) -> Result<Json<TablePage>, ApiError> {
    state
        .dashboard()
        .table_page(&query)
        .map(Json)
        .map_err(|err| state.reject(err))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChartRequest {
    pub table: Option<TableQuery>,
    pub selected_rows: BTreeSet<usize>,
}

pub async fn charts(
    State(state): State<AppState>,
    Json(request): Json<ChartRequest>,
) -> Result<Json<Vec<BarChart>>, ApiError> {
    state
        .dashboard()
        .column_charts(request.table.as_ref(), &request.selected_rows)
        .map(Json)
        .map_err(|err| state.reject(err))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StyleRequest {
    pub selected_columns: Vec<String>,
}

pub async fn styles(
    State(state): State<AppState>,
    Json(request): Json<StyleRequest>,
) -> Json<Vec<StyleOverride>> {
    Json(state.dashboard().styles(&request.selected_columns))
}

pub async fn events(
    State(state): State<AppState>,
    Json(event): Json<UiEvent>,
) -> Result<Json<Vec<View>>, ApiError> {
    state
        .dashboard()
        .dispatch(event.source, &event.state)
        .map(Json)
        .map_err(|err| state.reject(err))
}
