//! Pulse snapshots written to a well-known JSON file for the dashboard.

use std::path::PathBuf;
use tracing::debug;

use super::json_state_adapter::write_json_atomic;
use crate::domain::pulse::PulseSnapshot;
use crate::ports::pulse_port::PulsePort;

pub struct PulseFileAdapter {
    path: PathBuf,
}

impl PulseFileAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PulsePort for PulseFileAdapter {
    fn emit(&self, snapshot: &PulseSnapshot) {
        if let Err(e) = write_json_atomic(&self.path, snapshot) {
            debug!(path = %self.path.display(), error = %e, "pulse write failed");
        }
    }
}
