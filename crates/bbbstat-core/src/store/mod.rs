//! Sources of meeting records. Production reads the DynamoDB table; local runs
//! and tests use a JSON file or an in-memory list.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::Result;
use crate::record::{
    MeetingRecord, DATE_TIME, ID, LISTENER_COUNT, MEETING_COUNT, PARTICIPANT_COUNT, VIDEO_COUNT,
    VOICE_PARTICIPANT_COUNT,
};

#[cfg(feature = "runtime")]
pub mod dynamo;

#[cfg(feature = "runtime")]
pub use dynamo::DynamoRecordSource;

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Reads every record in one pass. Order is unspecified.
    async fn scan_all(&self) -> Result<Vec<MeetingRecord>>;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<MeetingRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<MeetingRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn scan_all(&self) -> Result<Vec<MeetingRecord>> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory ({} records)", self.records.len())
    }
}

/// A JSON array of objects keyed like the table attributes. Fields are decoded
/// leniently, the same way as store items.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn scan_all(&self) -> Result<Vec<MeetingRecord>> {
        let contents = tokio::fs::read(&self.path).await?;
        let items: Vec<Value> = serde_json::from_slice(&contents)?;

        let skipped = items.iter().filter(|item| !item.is_object()).count();
        if skipped > 0 {
            warn!(path = %self.path.display(), skipped, "non-object entries read as empty records");
        }

        let records: Vec<MeetingRecord> = items.iter().map(record_from_json).collect();
        info!(path = %self.path.display(), count = records.len(), "loaded records from file");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Decodes a stored count. Integral strings parse directly; fractional values
/// are truncated toward zero. Anything else is treated as missing.
pub fn parse_count(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && value.abs() < i64::MAX as f64)
        .map(|value| value.trunc() as i64)
}

fn json_text(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

fn json_count(item: &Value, key: &str) -> Option<i64> {
    match item.get(key)? {
        Value::Number(value) => value.as_i64().or_else(|| parse_count(&value.to_string())),
        Value::String(value) => parse_count(value),
        _ => None,
    }
}

pub fn record_from_json(item: &Value) -> MeetingRecord {
    MeetingRecord {
        id: json_text(item, ID),
        date_time: json_text(item, DATE_TIME),
        meeting_count: json_count(item, MEETING_COUNT),
        listener_count: json_count(item, LISTENER_COUNT),
        participant_count: json_count(item, PARTICIPANT_COUNT),
        video_count: json_count(item, VIDEO_COUNT),
        voice_participant_count: json_count(item, VOICE_PARTICIPANT_COUNT),
    }
}
