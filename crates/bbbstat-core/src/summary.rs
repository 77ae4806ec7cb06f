use polars::prelude::*;
use serde::Serialize;

use crate::config::DisplayConfig;
use crate::error::Result;
use crate::record::Column;

/// Column totals over the full chronological view. Null counts contribute
/// nothing; an empty view sums to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub meeting_count: i64,
    pub listener_count: i64,
    pub participant_count: i64,
    pub video_count: i64,
    pub voice_participant_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryCard {
    pub column: Column,
    pub title: String,
    pub total: i64,
}

impl Summary {
    pub fn from_frame(frame: &DataFrame) -> Result<Self> {
        let total = |column: Column| -> Result<i64> {
            Ok(frame.column(column.id())?.i64()?.sum().unwrap_or(0))
        };

        Ok(Self {
            meeting_count: total(Column::MeetingCount)?,
            listener_count: total(Column::ListenerCount)?,
            participant_count: total(Column::ParticipantCount)?,
            video_count: total(Column::VideoCount)?,
            voice_participant_count: total(Column::VoiceParticipantCount)?,
        })
    }

    pub fn total(&self, column: Column) -> i64 {
        match column {
            Column::DateTime => 0,
            Column::MeetingCount => self.meeting_count,
            Column::ListenerCount => self.listener_count,
            Column::ParticipantCount => self.participant_count,
            Column::VideoCount => self.video_count,
            Column::VoiceParticipantCount => self.voice_participant_count,
        }
    }

    /// The five cards across the top of the page.
    pub fn cards(&self, display: &DisplayConfig) -> Vec<SummaryCard> {
        Column::COUNTS
            .into_iter()
            .map(|column| SummaryCard {
                column,
                title: display.label(column).to_string(),
                total: self.total(column),
            })
            .collect()
    }
}
