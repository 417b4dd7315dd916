//! Running build service

use std::sync::Arc;

use chrono::{DateTime, Local, TimeDelta};
use tracing::debug;

use crate::application::ApplicationResult;
use crate::infrastructure::JenkinsApi;

/// One row of the running build listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningBuildRow {
    pub full_display_name: String,
    pub started_at: DateTime<Local>,
    pub elapsed: TimeDelta,
    pub url: String,
    /// Node the build runs on; empty for the built-in node
    pub built_on: String,
}

impl RunningBuildRow {
    /// `2024-03-01 09:15:02 (1 days, 3 hours)`
    pub fn started_label(&self) -> String {
        let hours = self.elapsed.num_hours().max(0);
        format!(
            "{} ({} days, {} hours)",
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            hours / 24,
            hours % 24
        )
    }
}

/// Service for inspecting running builds.
pub struct BuildService {
    api: Arc<dyn JenkinsApi>,
}

impl BuildService {
    /// Create a new build service.
    pub fn new(api: Arc<dyn JenkinsApi>) -> Self {
        Self { api }
    }

    /// Builds that have been running for more than `longer_than_secs` at `now`.
    pub fn running(
        &self,
        longer_than_secs: u64,
        now: DateTime<Local>,
    ) -> ApplicationResult<Vec<RunningBuildRow>> {
        let threshold_ms = i64::try_from(longer_than_secs)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);

        let mut rows = Vec::new();
        for build in self.api.get_running_builds()? {
            let info = self.api.get_build_info(&build)?;
            let Some(started_at) = DateTime::from_timestamp_millis(info.timestamp) else {
                debug!("running: {} has invalid timestamp {}", build.url, info.timestamp);
                continue;
            };
            let started_at = started_at.with_timezone(&Local);
            let elapsed = now.signed_duration_since(started_at);
            if elapsed.num_milliseconds() <= threshold_ms {
                continue;
            }
            rows.push(RunningBuildRow {
                full_display_name: info.full_display_name,
                started_at,
                elapsed,
                url: info.url,
                built_on: info.built_on,
            });
        }
        Ok(rows)
    }
}
