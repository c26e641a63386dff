use serde::{Deserialize, Serialize};

use attachlink_markers::MarkerStatus;

/// Counters for one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Markers visible in the snapshot, processed or not.
    pub markers: usize,
    /// Session groups that reached authentication this pass.
    pub groups: usize,
    pub found: usize,
    pub not_found: usize,
    pub errors: usize,
    /// Groups whose authentication failed outright.
    pub auth_failures: usize,
    /// Markers left untouched because they already carried a non-new status.
    pub skipped: usize,
    pub time_ms: u64,
}

impl RunStats {
    pub(crate) fn count(&mut self, status: MarkerStatus) {
        match status {
            MarkerStatus::Found => self.found += 1,
            MarkerStatus::NotFound => self.not_found += 1,
            MarkerStatus::Error => self.errors += 1,
            MarkerStatus::New | MarkerStatus::Loading => {}
        }
    }
}
