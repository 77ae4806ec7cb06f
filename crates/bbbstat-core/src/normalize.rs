use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone as _, Utc};
use chrono_tz::Tz;
use polars::df;
use polars::lazy::dsl::*;
use polars::prelude::*;
use tracing::{debug, warn};

use crate::error::{DashboardError, Result};
use crate::record::{
    Column, MeetingRecord, DATE_TIME, ID, LISTENER_COUNT, MEETING_COUNT, MONTH,
    PARTICIPANT_COUNT, VIDEO_COUNT, VOICE_PARTICIPANT_COUNT,
};

pub const DEFAULT_UTC_OFFSET_HOURS: i64 = 2;
pub const DEFAULT_ROUND_MINUTES: i64 = 15;

const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// How stored UTC timestamps are moved onto the dashboard's wall clock.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeShift {
    Fixed(Duration),
    Zone(Tz),
}

impl TimeShift {
    /// `None` when the shifted value falls outside chrono's range.
    pub fn apply(&self, timestamp: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            TimeShift::Fixed(offset) => timestamp.checked_add_signed(*offset),
            TimeShift::Zone(zone) => Some(zone.from_utc_datetime(&timestamp).naive_local()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeConfig {
    pub shift: TimeShift,
    pub round_to: Duration,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            shift: TimeShift::Fixed(Duration::hours(DEFAULT_UTC_OFFSET_HOURS)),
            round_to: Duration::minutes(DEFAULT_ROUND_MINUTES),
        }
    }
}

/// The two frames every dashboard view is derived from.
///
/// `chronological` holds `date_time` (microsecond datetime, nulls last) and the
/// five count columns. `monthly` is the same frame with an `Int32` `month`
/// column appended.
#[derive(Debug, Clone)]
pub struct NormalizedViews {
    pub chronological: DataFrame,
    pub monthly: DataFrame,
}

/// Parses a stored `date_time` attribute. Unrecognised input yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_utc());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Rounds to the nearest multiple of `interval` counted from the epoch. Ties go
/// to the even multiple. A multiple outside the `i64` range falls back to the
/// one below `value`.
pub fn round_micros(value: i64, interval: i64) -> i64 {
    debug_assert!(interval > 0);
    let wide_interval = i128::from(interval);
    let bucket = i128::from(value).div_euclid(wide_interval);
    let remainder = i128::from(value).rem_euclid(wide_interval);

    let rounded = match (remainder * 2).cmp(&wide_interval) {
        std::cmp::Ordering::Less => bucket,
        std::cmp::Ordering::Greater => bucket + 1,
        std::cmp::Ordering::Equal if bucket.rem_euclid(2) == 0 => bucket,
        std::cmp::Ordering::Equal => bucket + 1,
    };
    i64::try_from(rounded * wide_interval)
        .or_else(|_| i64::try_from(bucket * wide_interval))
        .unwrap_or(value)
}

pub fn round_timestamp(timestamp: NaiveDateTime, interval: Duration) -> Option<NaiveDateTime> {
    let interval = interval.num_microseconds().filter(|micros| *micros > 0)?;
    naive_from_micros(round_micros(naive_to_micros(timestamp), interval))
}

pub fn naive_to_micros(value: NaiveDateTime) -> i64 {
    let dt_utc = value.and_utc();
    dt_utc.timestamp() * 1_000_000 + i64::from(dt_utc.timestamp_subsec_nanos() / 1_000)
}

pub fn naive_from_micros(value: i64) -> Option<NaiveDateTime> {
    let secs = value.div_euclid(1_000_000);
    let micros = value.rem_euclid(1_000_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, micros * 1_000).map(|dt| dt.naive_utc())
}

/// Builds the chronological and monthly-indexed views from a bulk scan.
///
/// Timestamps are parsed, shifted, stably sorted ascending with nulls last,
/// then rounded. The record `id` never leaves this function. Row count always
/// equals `records.len()`.
pub fn normalize(records: &[MeetingRecord], config: &NormalizeConfig) -> Result<NormalizedViews> {
    let interval = config
        .round_to
        .num_microseconds()
        .filter(|micros| *micros > 0)
        .ok_or_else(|| {
            DashboardError::Config(format!(
                "rounding interval must be positive and fit in microseconds, got {}",
                config.round_to
            ))
        })?;

    let mut order: Vec<(usize, Option<i64>)> = records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let timestamp = record
                .date_time
                .as_deref()
                .and_then(parse_timestamp)
                .and_then(|ts| config.shift.apply(ts))
                .map(naive_to_micros);
            (idx, timestamp)
        })
        .collect();

    let unparsed = order.iter().filter(|(_, ts)| ts.is_none()).count();
    if unparsed > 0 {
        warn!(unparsed, total = records.len(), "coerced unparseable timestamps to null");
    }

    order.sort_by_key(|(_, ts)| (ts.is_none(), *ts));

    let timestamps: Vec<Option<i64>> = order
        .iter()
        .map(|(_, ts)| ts.map(|micros| round_micros(micros, interval)))
        .collect();
    let months: Vec<Option<i32>> = timestamps
        .iter()
        .map(|ts| ts.and_then(naive_from_micros).map(|dt| dt.month() as i32))
        .collect();
    let ids: Vec<Option<&str>> = order
        .iter()
        .map(|(idx, _)| records[*idx].id.as_deref())
        .collect();
    let counts = |column: Column| -> Vec<Option<i64>> {
        order
            .iter()
            .map(|(idx, _)| records[*idx].count(column))
            .collect()
    };

    let raw = df![
        ID => ids,
        DATE_TIME => timestamps,
        MEETING_COUNT => counts(Column::MeetingCount),
        LISTENER_COUNT => counts(Column::ListenerCount),
        PARTICIPANT_COUNT => counts(Column::ParticipantCount),
        VIDEO_COUNT => counts(Column::VideoCount),
        VOICE_PARTICIPANT_COUNT => counts(Column::VoiceParticipantCount),
    ]?;

    let chronological = raw
        .lazy()
        .with_column(
            col(DATE_TIME)
                .cast(DataType::Datetime(TimeUnit::Microseconds, None))
                .alias(DATE_TIME),
        )
        .select([
            col(DATE_TIME),
            col(MEETING_COUNT),
            col(LISTENER_COUNT),
            col(PARTICIPANT_COUNT),
            col(VIDEO_COUNT),
            col(VOICE_PARTICIPANT_COUNT),
        ])
        .collect()?;

    let mut monthly = chronological.clone();
    monthly.with_column(Series::new(MONTH.into(), months))?;

    debug!(rows = chronological.height(), "normalized meeting records");

    Ok(NormalizedViews {
        chronological,
        monthly,
    })
}
