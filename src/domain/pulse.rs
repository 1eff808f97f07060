//! Pulse snapshots: the transient deliberation state an external dashboard
//! polls. Phases are never persisted beyond the latest snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ledger::TreasuryState;
use super::market::Vote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Idle,
    Scanning,
    Deliberating,
    Deciding,
    Executing,
}

/// Trimmed treasury view carried in each pulse and printed by `status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasurySummary {
    pub total: f64,
    pub daily_pnl: f64,
    pub weekly_pnl: f64,
    pub total_pnl: f64,
    pub win_rate: f64,
    pub trades: u64,
}

impl TreasurySummary {
    pub fn from_state(state: &TreasuryState) -> Self {
        TreasurySummary {
            total: state.balances.total,
            daily_pnl: state.daily.pnl,
            weekly_pnl: state.weekly.pnl,
            total_pnl: state.performance.total_pnl,
            win_rate: state.performance.win_rate(),
            trades: state.performance.trade_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PulseSnapshot {
    pub cycle: u64,
    pub phase: Phase,
    pub agent: Option<String>,
    pub market: Option<String>,
    pub votes: Vec<Vote>,
    pub consensus: Option<f64>,
    pub blessing: bool,
    pub decision: Option<String>,
    pub treasury: TreasurySummary,
    pub timestamp: DateTime<Utc>,
}

impl PulseSnapshot {
    pub fn new(cycle: u64, phase: Phase, treasury: TreasurySummary, timestamp: DateTime<Utc>) -> Self {
        PulseSnapshot {
            cycle,
            phase,
            agent: None,
            market: None,
            votes: Vec::new(),
            consensus: None,
            blessing: false,
            decision: None,
            treasury,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn snapshot_serializes_phase_tag() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 9, 0, 0).unwrap();
        let state = TreasuryState::new(300.0, now);
        let snap = PulseSnapshot::new(3, Phase::Deliberating, TreasurySummary::from_state(&state), now);
        let v = serde_json::to_value(&snap).unwrap();
        assert_eq!(v["phase"], "DELIBERATING");
        assert_eq!(v["cycle"], 3);
        assert_eq!(v["treasury"]["total"], 300.0);
    }

    #[test]
    fn summary_reflects_state() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 9, 0, 0).unwrap();
        let mut state = TreasuryState::new(300.0, now);
        state.performance.win_count = 3;
        state.performance.loss_count = 1;
        let s = TreasurySummary::from_state(&state);
        assert_eq!(s.trades, 4);
        assert_eq!(s.win_rate, 0.75);
    }
}
