use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::DisplayConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::figure::Figure;
use crate::normalize::NormalizeConfig;
use crate::reactive::{EventSource, Subscriptions, UiState, View};
use crate::reconcile::{column_charts, BarChart};
use crate::record::{ColumnSet, MeetingRecord};
use crate::series::{month_series, MonthSelector};
use crate::styles::{column_highlights, StyleOverride};
use crate::summary::SummaryCard;
use crate::table::{column_headers, table_page, virtual_rows, ColumnHeader, TablePage, TableQuery};

/// Initial page description served to the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardLayout {
    pub cards: Vec<SummaryCard>,
    pub selector: MonthSelector,
    pub columns: Vec<ColumnHeader>,
    pub page_size: usize,
    pub views: Vec<View>,
}

/// The immutable dataset plus the display settings every view needs.
#[derive(Debug)]
pub struct Dashboard {
    dataset: Dataset,
    display: DisplayConfig,
    subscriptions: Subscriptions,
}

impl Dashboard {
    pub fn new(dataset: Dataset, display: DisplayConfig) -> Self {
        Self {
            dataset,
            display,
            subscriptions: Subscriptions::dashboard(),
        }
    }

    pub fn build(
        records: &[MeetingRecord],
        normalize: &NormalizeConfig,
        display: DisplayConfig,
    ) -> Result<Self> {
        Ok(Self::new(Dataset::build(records, normalize)?, display))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    pub fn summary_cards(&self) -> Vec<SummaryCard> {
        self.dataset.summary().cards(&self.display)
    }

    pub fn meeting_history(&self, month: u32) -> Result<Figure> {
        Ok(month_series(self.dataset.monthly(), month)?.figure())
    }

    pub fn table_page(&self, query: &TableQuery) -> Result<TablePage> {
        table_page(self.dataset.rows(), query, &self.display)
    }

    pub fn column_charts(
        &self,
        table: Option<&TableQuery>,
        selected_rows: &BTreeSet<usize>,
    ) -> Result<Vec<BarChart>> {
        let all_rows = self.dataset.rows();
        let charts = match table {
            Some(query) => {
                let visible = virtual_rows(all_rows, query)?;
                column_charts(
                    all_rows,
                    Some(visible.as_slice()),
                    selected_rows,
                    &query.columns(),
                    &self.display,
                )
            }
            None => column_charts(all_rows, None, selected_rows, &ColumnSet::all(), &self.display),
        };
        Ok(charts)
    }

    pub fn styles<S: AsRef<str>>(&self, selected_columns: &[S]) -> Vec<StyleOverride> {
        column_highlights(selected_columns)
    }

    pub fn dispatch(&self, source: EventSource, state: &UiState) -> Result<Vec<View>> {
        self.subscriptions.dispatch(self, source, state)
    }

    pub fn layout(&self) -> Result<DashboardLayout> {
        Ok(DashboardLayout {
            cards: self.summary_cards(),
            selector: MonthSelector::from_display(&self.display),
            columns: column_headers(&ColumnSet::all(), &self.display),
            page_size: self.display.page_size,
            views: self
                .subscriptions
                .render_all(self, &UiState::default())?,
        })
    }
}
