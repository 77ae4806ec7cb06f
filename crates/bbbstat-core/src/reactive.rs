//! Wiring between browser inputs and the views they invalidate.
//!
//! Each [`Subscription`] declares which [`EventSource`]s it reads and which
//! [`ViewTarget`] it produces. Dispatching an event re-renders exactly the
//! subscriptions listening to that source, in declaration order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::figure::Figure;
use crate::reconcile::BarChart;
use crate::styles::StyleOverride;
use crate::table::{TablePage, TableQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    MonthSelector,
    TableQuery,
    SelectedRows,
    SelectedColumns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewTarget {
    MeetingHistory,
    ColumnCharts,
    TableStyles,
    TablePage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "target", content = "view", rename_all = "snake_case")]
pub enum View {
    MeetingHistory(Figure),
    ColumnCharts(Vec<BarChart>),
    TableStyles(Vec<StyleOverride>),
    TablePage(TablePage),
}

impl View {
    pub fn target(&self) -> ViewTarget {
        match self {
            View::MeetingHistory(_) => ViewTarget::MeetingHistory,
            View::ColumnCharts(_) => ViewTarget::ColumnCharts,
            View::TableStyles(_) => ViewTarget::TableStyles,
            View::TablePage(_) => ViewTarget::TablePage,
        }
    }
}

/// Current state of every input on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiState {
    pub month: Option<u32>,
    /// `None` until the table reports its filter/sort state.
    pub table: Option<TableQuery>,
    pub selected_rows: BTreeSet<usize>,
    pub selected_columns: Vec<String>,
}

/// A browser event together with the page state after the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiEvent {
    pub source: EventSource,
    #[serde(default)]
    pub state: UiState,
}

type Handler = fn(&Dashboard, &UiState) -> Result<View>;

pub struct Subscription {
    pub output: ViewTarget,
    pub inputs: &'static [EventSource],
    handler: Handler,
}

impl Subscription {
    pub fn listens_to(&self, source: EventSource) -> bool {
        self.inputs.contains(&source)
    }

    pub fn render(&self, dashboard: &Dashboard, state: &UiState) -> Result<View> {
        (self.handler)(dashboard, state)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("output", &self.output)
            .field("inputs", &self.inputs)
            .finish()
    }
}

#[derive(Debug)]
pub struct Subscriptions {
    entries: Vec<Subscription>,
}

impl Subscriptions {
    /// The dashboard page: scatter chart, per-column bar charts, column
    /// highlights and the table itself.
    pub fn dashboard() -> Self {
        Self {
            entries: vec![
                Subscription {
                    output: ViewTarget::MeetingHistory,
                    inputs: &[EventSource::MonthSelector],
                    handler: render_meeting_history,
                },
                Subscription {
                    output: ViewTarget::ColumnCharts,
                    inputs: &[EventSource::TableQuery, EventSource::SelectedRows],
                    handler: render_column_charts,
                },
                Subscription {
                    output: ViewTarget::TableStyles,
                    inputs: &[EventSource::SelectedColumns],
                    handler: render_table_styles,
                },
                Subscription {
                    output: ViewTarget::TablePage,
                    inputs: &[EventSource::TableQuery],
                    handler: render_table_page,
                },
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.entries.iter()
    }

    pub fn affected_by(&self, source: EventSource) -> impl Iterator<Item = &Subscription> {
        self.entries
            .iter()
            .filter(move |subscription| subscription.listens_to(source))
    }

    pub fn dispatch(
        &self,
        dashboard: &Dashboard,
        source: EventSource,
        state: &UiState,
    ) -> Result<Vec<View>> {
        let views = self
            .affected_by(source)
            .map(|subscription| subscription.render(dashboard, state))
            .collect::<Result<Vec<_>>>()?;
        debug!(?source, rendered = views.len(), "dispatched ui event");
        Ok(views)
    }

    /// Renders every view, as on first page load.
    pub fn render_all(&self, dashboard: &Dashboard, state: &UiState) -> Result<Vec<View>> {
        self.entries
            .iter()
            .map(|subscription| subscription.render(dashboard, state))
            .collect()
    }
}

fn render_meeting_history(dashboard: &Dashboard, state: &UiState) -> Result<View> {
    let month = state.month.unwrap_or(dashboard.display().default_month);
    dashboard.meeting_history(month).map(View::MeetingHistory)
}

fn render_column_charts(dashboard: &Dashboard, state: &UiState) -> Result<View> {
    dashboard
        .column_charts(state.table.as_ref(), &state.selected_rows)
        .map(View::ColumnCharts)
}

fn render_table_styles(dashboard: &Dashboard, state: &UiState) -> Result<View> {
    Ok(View::TableStyles(dashboard.styles(&state.selected_columns)))
}

fn render_table_page(dashboard: &Dashboard, state: &UiState) -> Result<View> {
    let fallback = TableQuery::default();
    let query = state.table.as_ref().unwrap_or(&fallback);
    dashboard.table_page(query).map(View::TablePage)
}
