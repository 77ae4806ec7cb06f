use polars::prelude::*;
use serde::Serialize;

use crate::config::{DisplayConfig, MonthMark};
use crate::error::{DashboardError, Result};
use crate::figure::{self, Axis, Figure, Layout, Trace, TraceKind};
use crate::normalize::naive_from_micros;
use crate::record::{DATE_TIME, MEETING_COUNT, MONTH};

const SCATTER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Meeting counts over time for one calendar month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthSeries {
    pub month: u32,
    pub timestamps: Vec<Option<String>>,
    pub meeting_counts: Vec<Option<i64>>,
}

impl MonthSeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn figure(&self) -> Figure {
        let mut layout = Layout::dark(300);
        layout.title = figure::title("Online Meeting Data");
        layout.yaxis = Axis {
            title: figure::title("Meeting Count"),
            automargin: None,
        };
        layout.hovermode = Some("closest");

        Figure {
            data: vec![Trace {
                kind: TraceKind::Scatter,
                x: self.timestamps.clone(),
                y: self.meeting_counts.clone(),
                mode: Some("markers"),
                marker: None,
            }],
            layout,
        }
    }
}

/// Rows of the monthly-indexed view whose `month` key equals `month`.
pub fn filter_month(monthly: &DataFrame, month: u32) -> Result<DataFrame> {
    if !(1..=12).contains(&month) {
        return Err(DashboardError::InvalidMonth(month));
    }
    let mask = monthly.column(MONTH)?.i32()?.equal(month as i32);
    Ok(monthly.filter(&mask)?)
}

pub fn month_series(monthly: &DataFrame, month: u32) -> Result<MonthSeries> {
    let filtered = filter_month(monthly, month)?;
    let timestamps = filtered.column(DATE_TIME)?.datetime()?;
    let meetings = filtered.column(MEETING_COUNT)?.i64()?;

    let mut series = MonthSeries {
        month,
        ..MonthSeries::default()
    };
    for idx in 0..filtered.height() {
        series.timestamps.push(
            timestamps
                .get(idx)
                .and_then(naive_from_micros)
                .map(|ts| ts.format(SCATTER_TIMESTAMP_FORMAT).to_string()),
        );
        series.meeting_counts.push(meetings.get(idx));
    }
    Ok(series)
}

/// The discrete month slider under the scatter chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSelector {
    pub min: u32,
    pub max: u32,
    pub value: u32,
    pub marks: Vec<MonthMark>,
}

impl MonthSelector {
    pub fn from_display(display: &DisplayConfig) -> Self {
        let months = display.month_marks.iter().map(|mark| mark.month);
        Self {
            min: months.clone().min().unwrap_or(display.default_month),
            max: months.max().unwrap_or(display.default_month),
            value: display.default_month,
            marks: display.month_marks.clone(),
        }
    }
}
