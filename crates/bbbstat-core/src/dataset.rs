use polars::prelude::DataFrame;
use tracing::info;

use crate::error::Result;
use crate::normalize::{normalize, NormalizeConfig, NormalizedViews};
use crate::record::MeetingRecord;
use crate::summary::Summary;
use crate::table::TableRow;

/// Everything derived from one bulk scan. Built once at startup and only read
/// afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    views: NormalizedViews,
    rows: Vec<TableRow>,
    summary: Summary,
}

impl Dataset {
    pub fn build(records: &[MeetingRecord], config: &NormalizeConfig) -> Result<Self> {
        let views = normalize(records, config)?;
        let rows = TableRow::from_frame(&views.chronological)?;
        let summary = Summary::from_frame(&views.chronological)?;

        info!(
            records = records.len(),
            meetings = summary.meeting_count,
            "dataset ready"
        );

        Ok(Self {
            views,
            rows,
            summary,
        })
    }

    pub fn chronological(&self) -> &DataFrame {
        &self.views.chronological
    }

    pub fn monthly(&self) -> &DataFrame {
        &self.views.monthly
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
