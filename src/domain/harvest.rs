//! Reserve harvesting: sweep reserve above its retention floor into savings.

use chrono::{DateTime, Utc};

use super::agent::Bucket;
use super::config::HarvestPolicy;
use super::ledger::{HistoryEntry, HistoryKind, TreasuryState};

/// Move `reserve - total * min_reserve_pct` into savings when it exceeds
/// `min_harvest`. Returns the amount moved, or 0 when nothing changed.
pub fn harvest(state: &mut TreasuryState, policy: &HarvestPolicy, now: DateTime<Utc>, history_limit: usize) -> f64 {
    let floor = state.balances.total * policy.min_reserve_pct;
    let excess = state.balances.treasury_reserve - floor;
    if excess <= policy.min_harvest {
        return 0.0;
    }

    state.roll_periods(now);
    state.balances.credit(Bucket::TreasuryReserve, -excess);
    state.balances.credit(Bucket::SavingsStaking, excess);
    state.weekly.savings_contributed += excess;
    state.push_history(
        HistoryEntry {
            timestamp: now,
            kind: HistoryKind::Harvest,
            agent: None,
            market: None,
            amount: excess,
            balance: state.balances.total,
        },
        history_limit,
    );
    state.last_updated = now;
    excess
}
