use std::collections::BTreeMap;
use std::path::Path;

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::normalize::{NormalizeConfig, TimeShift};
use crate::record::Column;

pub const ACCESS_KEY_VAR: &str = "ACCESS_KEY";
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
pub const TABLE_VAR: &str = "BBBSTAT_TABLE";
pub const REGION_VAR: &str = "BBBSTAT_REGION";
pub const ENDPOINT_VAR: &str = "BBBSTAT_DYNAMODB_ENDPOINT";
pub const UTC_OFFSET_VAR: &str = "BBBSTAT_UTC_OFFSET_HOURS";
pub const TIMEZONE_VAR: &str = "BBBSTAT_TIMEZONE";
pub const ROUND_MINUTES_VAR: &str = "BBBSTAT_ROUND_MINUTES";

pub const DEFAULT_TABLE: &str = "bbb_stat";
pub const DEFAULT_REGION: &str = "eu-central-1";

/// Connection settings for the DynamoDB table holding the meeting stats.
#[derive(Clone)]
pub struct StoreConfig {
    pub table: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("table", &self.table)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Both credentials
    /// are required; everything else has a default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(DashboardError::MissingEnv(key))
        };

        Ok(Self {
            access_key_id: required(ACCESS_KEY_VAR)?,
            secret_access_key: required(SECRET_KEY_VAR)?,
            table: lookup(TABLE_VAR).unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            region: lookup(REGION_VAR).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: lookup(ENDPOINT_VAR).filter(|value| !value.is_empty()),
        })
    }
}

impl NormalizeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = NormalizeConfig::default();

        if let Some(raw) = lookup(UTC_OFFSET_VAR) {
            let hours: i64 = raw.trim().parse().map_err(|_| {
                DashboardError::Config(format!("{UTC_OFFSET_VAR} must be a whole number of hours, got '{raw}'"))
            })?;
            let offset = Duration::try_hours(hours).ok_or_else(|| {
                DashboardError::Config(format!("{UTC_OFFSET_VAR} is out of range: {hours}"))
            })?;
            config.shift = TimeShift::Fixed(offset);
        }

        if let Some(raw) = lookup(TIMEZONE_VAR).filter(|value| !value.is_empty()) {
            let zone: Tz = raw
                .trim()
                .parse()
                .map_err(|_| DashboardError::Config(format!("unknown time zone '{raw}'")))?;
            config.shift = TimeShift::Zone(zone);
        }

        if let Some(raw) = lookup(ROUND_MINUTES_VAR) {
            let minutes: i64 = raw.trim().parse().map_err(|_| {
                DashboardError::Config(format!("{ROUND_MINUTES_VAR} must be a number of minutes, got '{raw}'"))
            })?;
            if minutes <= 0 {
                return Err(DashboardError::Config(format!(
                    "{ROUND_MINUTES_VAR} must be positive, got {minutes}"
                )));
            }
            config.round_to = Duration::try_minutes(minutes).ok_or_else(|| {
                DashboardError::Config(format!("{ROUND_MINUTES_VAR} is out of range: {minutes}"))
            })?;
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthMark {
    pub month: u32,
    pub label: String,
}

/// Presentation settings. Every field has a built-in default and can be
/// overridden from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Column id to header label.
    pub labels: BTreeMap<String, String>,
    pub month_marks: Vec<MonthMark>,
    pub default_month: u32,
    pub page_size: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let month_marks = [(3, "März"), (4, "April"), (5, "Mai"), (6, "Juni"), (7, "Juli")]
            .into_iter()
            .map(|(month, label)| MonthMark {
                month,
                label: label.to_string(),
            })
            .collect();

        Self {
            labels: BTreeMap::new(),
            month_marks,
            default_month: 3,
            page_size: 10,
        }
    }
}

impl DisplayConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: DisplayConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn label(&self, column: Column) -> &str {
        self.labels
            .get(column.id())
            .map(String::as_str)
            .unwrap_or_else(|| column.default_label())
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(DashboardError::Config("page_size must be positive".into()));
        }
        if !(1..=12).contains(&self.default_month) {
            return Err(DashboardError::Config(format!(
                "default_month {} is not a calendar month",
                self.default_month
            )));
        }
        if let Some(mark) = self.month_marks.iter().find(|mark| !(1..=12).contains(&mark.month)) {
            return Err(DashboardError::Config(format!(
                "month mark '{}' uses month {}, expected 1-12",
                mark.label, mark.month
            )));
        }
        for key in self.labels.keys() {
            key.parse::<Column>().map_err(DashboardError::Config)?;
        }
        Ok(())
    }
}
