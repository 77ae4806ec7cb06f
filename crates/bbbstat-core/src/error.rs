// crates/bbbstat-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable {0} must be set")]
    MissingEnv(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record store scan failed: {0}")]
    Store(String),

    #[error("Invalid month {0}: expected a value between 1 and 12")]
    InvalidMonth(u32),

    #[error("Invalid filter on column {column}: {reason}")]
    InvalidFilter { column: String, reason: String },

    #[error("Data processing error: {0}")]
    Processing(String),
}

impl DashboardError {
    /// True when the error was caused by caller input rather than by the
    /// dataset or the environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DashboardError::InvalidMonth(_) | DashboardError::InvalidFilter { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
