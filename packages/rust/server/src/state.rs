//! Shared application state for the HTTP server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use webbaby_core::CommandPipeline;
use webbaby_storage::Storage;

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Command pipeline; also owns the store handle
    pub pipeline: Arc<CommandPipeline>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: CommandPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            started_at: Utc::now(),
        }
    }

    pub fn storage(&self) -> &Storage {
        self.pipeline.storage()
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
