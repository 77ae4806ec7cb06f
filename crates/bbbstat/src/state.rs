use std::sync::Arc;

use bbbstat_core::{Dashboard, DashboardError};

use crate::error::ApiError;

/// Shared by every handler. The dashboard is read-only after startup, so no
/// lock is needed.
#[derive(Clone)]
pub struct AppState {
    dashboard: Arc<Dashboard>,
    debug: bool,
}

impl AppState {
    pub fn new(dashboard: Arc<Dashboard>, debug: bool) -> Self {
        Self { dashboard, debug }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn reject(&self, error: DashboardError) -> ApiError {
        ApiError::new(error, self.debug)
    }
}
