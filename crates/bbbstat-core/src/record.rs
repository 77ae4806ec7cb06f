use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DATE_TIME: &str = "date_time";
pub const MEETING_COUNT: &str = "meetingCount";
pub const LISTENER_COUNT: &str = "listenerCount";
pub const PARTICIPANT_COUNT: &str = "participantCount";
pub const VIDEO_COUNT: &str = "videoCount";
pub const VOICE_PARTICIPANT_COUNT: &str = "voiceParticipantCount";
pub const ID: &str = "id";
pub const MONTH: &str = "month";

/// One row of the `bbb_stat` table as written by the conferencing server's
/// stats collector. Counts are optional because the collector has shipped
/// items with missing attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "date_time")]
    pub date_time: Option<String>,
    #[serde(default)]
    pub meeting_count: Option<i64>,
    #[serde(default)]
    pub listener_count: Option<i64>,
    #[serde(default)]
    pub participant_count: Option<i64>,
    #[serde(default)]
    pub video_count: Option<i64>,
    #[serde(default)]
    pub voice_participant_count: Option<i64>,
}

impl MeetingRecord {
    pub fn count(&self, column: Column) -> Option<i64> {
        match column {
            Column::DateTime => None,
            Column::MeetingCount => self.meeting_count,
            Column::ListenerCount => self.listener_count,
            Column::ParticipantCount => self.participant_count,
            Column::VideoCount => self.video_count,
            Column::VoiceParticipantCount => self.voice_participant_count,
        }
    }
}

/// A column of the dashboard table, identified on the wire by its store
/// attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "date_time")]
    DateTime,
    #[serde(rename = "meetingCount")]
    MeetingCount,
    #[serde(rename = "listenerCount")]
    ListenerCount,
    #[serde(rename = "participantCount")]
    ParticipantCount,
    #[serde(rename = "videoCount")]
    VideoCount,
    #[serde(rename = "voiceParticipantCount")]
    VoiceParticipantCount,
}

impl Column {
    /// Table order.
    pub const ALL: [Column; 6] = [
        Column::DateTime,
        Column::MeetingCount,
        Column::ParticipantCount,
        Column::ListenerCount,
        Column::VideoCount,
        Column::VoiceParticipantCount,
    ];

    /// Summary card order.
    pub const COUNTS: [Column; 5] = [
        Column::MeetingCount,
        Column::ListenerCount,
        Column::ParticipantCount,
        Column::VideoCount,
        Column::VoiceParticipantCount,
    ];

    /// Bar chart order.
    pub const CHARTED: [Column; 5] = [
        Column::MeetingCount,
        Column::ParticipantCount,
        Column::VideoCount,
        Column::ListenerCount,
        Column::VoiceParticipantCount,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Column::DateTime => DATE_TIME,
            Column::MeetingCount => MEETING_COUNT,
            Column::ListenerCount => LISTENER_COUNT,
            Column::ParticipantCount => PARTICIPANT_COUNT,
            Column::VideoCount => VIDEO_COUNT,
            Column::VoiceParticipantCount => VOICE_PARTICIPANT_COUNT,
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            Column::DateTime => "Datum/Uhrzeit",
            Column::MeetingCount => "Meetings",
            Column::ListenerCount => "Zuhörer",
            Column::ParticipantCount => "Teilnehmer",
            Column::VideoCount => "Video",
            Column::VoiceParticipantCount => "Sprecher",
        }
    }

    pub fn is_count(self) -> bool {
        !matches!(self, Column::DateTime)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|column| column.id() == s)
            .ok_or_else(|| format!("unknown column '{s}'"))
    }
}

/// Columns still present in the table after the user deleted some.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSet {
    present: BTreeSet<Column>,
}

impl ColumnSet {
    pub fn all() -> Self {
        Self {
            present: Column::ALL.into_iter().collect(),
        }
    }

    pub fn without<'a>(deleted: impl IntoIterator<Item = &'a Column>) -> Self {
        let mut set = Self::all();
        for column in deleted {
            set.present.remove(column);
        }
        set
    }

    pub fn contains(&self, column: Column) -> bool {
        self.present.contains(&column)
    }

    /// Present columns in table order.
    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        Column::ALL
            .into_iter()
            .filter(|column| self.present.contains(column))
    }

    pub fn len(&self) -> usize {
        self.present.len()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }
}

impl Default for ColumnSet {
    fn default() -> Self {
        Self::all()
    }
}
