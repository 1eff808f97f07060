//! Pulse port for the dashboard snapshot channel.

use crate::domain::pulse::PulseSnapshot;

/// Best-effort sink. Implementations must not fail the caller.
pub trait PulsePort {
    fn emit(&self, snapshot: &PulseSnapshot);
}

/// Discards every snapshot.
pub struct NoPulse;

impl PulsePort for NoPulse {
    fn emit(&self, _snapshot: &PulseSnapshot) {}
}
