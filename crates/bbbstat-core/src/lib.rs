pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod figure;
pub mod normalize;
pub mod reactive;
pub mod reconcile;
pub mod record;
pub mod series;
pub mod store;
pub mod styles;
pub mod summary;
pub mod table;

pub use dashboard::Dashboard;
pub use dataset::Dataset;
pub use error::{DashboardError, Result};
pub use record::{Column, ColumnSet, MeetingRecord};
