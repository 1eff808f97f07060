//! Trade settlement and win distribution.
//!
//! A trade's P&L is applied raw to the agent bucket and the grand total. A
//! winning trade is then split across reinvestment (back to the agent),
//! treasury reserve, savings and the bluechip accumulator. With
//! `double_credit` on, the agent keeps the raw win as well as its reinvest
//! share; with it off, the distributed amount is taken back out of the agent
//! bucket first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agent::{Agent, Bucket};
use super::config::DistributionPolicy;
use super::ledger::{HistoryEntry, HistoryKind, TradeRecord, TreasuryState};
use super::market::Direction;

/// A completed trade reported back to the treasury.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub agent: Agent,
    pub pnl: f64,
    pub size: f64,
    pub market: String,
    pub direction: Direction,
    pub confidence: f64,
    #[serde(default)]
    pub price: f64,
}

/// Where a win went.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinDistribution {
    pub reinvest: f64,
    pub treasury: f64,
    pub savings: f64,
    pub bluechip: f64,
}

impl WinDistribution {
    pub fn split(win: f64, policy: &DistributionPolicy) -> Self {
        WinDistribution {
            reinvest: win * policy.reinvest_pct,
            treasury: win * policy.treasury_pct,
            savings: win * policy.savings_pct,
            bluechip: win * policy.bluechip_pct,
        }
    }

    pub fn total(&self) -> f64 {
        self.reinvest + self.treasury + self.savings + self.bluechip
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub is_win: bool,
    pub new_total: f64,
    pub distribution: Option<WinDistribution>,
}

fn distribute(state: &mut TreasuryState, agent: Agent, win: f64, policy: &DistributionPolicy) -> WinDistribution {
    let split = WinDistribution::split(win, policy);
    let balances = &mut state.balances;

    if !policy.double_credit {
        balances.credit(agent.bucket(), -win);
    }
    balances.credit(agent.bucket(), split.reinvest);
    balances.credit(Bucket::TreasuryReserve, split.treasury);
    balances.credit(Bucket::SavingsStaking, split.savings);
    balances.credit(Bucket::BluechipAccumulator, split.bluechip);

    state.weekly.savings_contributed += split.savings;
    state.weekly.bluechip_dca += split.bluechip;
    split
}

fn update_extremes(state: &mut TreasuryState, trade: &Trade, now: DateTime<Utc>) {
    let record = || TradeRecord {
        agent: trade.agent,
        market: trade.market.clone(),
        pnl: trade.pnl,
        timestamp: now,
    };
    let perf = &mut state.performance;
    if perf.best_trade.as_ref().is_none_or(|best| trade.pnl > best.pnl) {
        perf.best_trade = Some(record());
    }
    if perf.worst_trade.as_ref().is_none_or(|worst| trade.pnl < worst.pnl) {
        perf.worst_trade = Some(record());
    }
}

/// Apply a completed trade to the ledger. Only `pnl > 0` counts as a win.
pub fn settle(
    state: &mut TreasuryState,
    trade: &Trade,
    now: DateTime<Utc>,
    policy: &DistributionPolicy,
    history_limit: usize,
) -> Settlement {
    state.roll_periods(now);

    let is_win = trade.pnl > 0.0;
    state.balances.credit(trade.agent.bucket(), trade.pnl);
    state.balances.credit(Bucket::Total, trade.pnl);

    let distribution = is_win.then(|| distribute(state, trade.agent, trade.pnl, policy));

    let perf = &mut state.performance;
    perf.total_pnl += trade.pnl;
    if is_win {
        perf.total_wins += trade.pnl;
        perf.win_count += 1;
    } else {
        perf.total_losses += -trade.pnl;
        perf.loss_count += 1;
    }
    update_extremes(state, trade, now);

    state.daily.pnl += trade.pnl;
    state.daily.trades += 1;
    if is_win {
        state.daily.wins += 1;
    } else {
        state.daily.losses += 1;
    }
    state.weekly.pnl += trade.pnl;
    state.weekly.trades += 1;

    state
        .agent_stats
        .entry(trade.agent)
        .or_default()
        .record(trade.pnl, is_win);

    let new_total = state.balances.total;
    state.push_history(
        HistoryEntry {
            timestamp: now,
            kind: HistoryKind::Trade,
            agent: Some(trade.agent),
            market: Some(trade.market.clone()),
            amount: trade.pnl,
            balance: new_total,
        },
        history_limit,
    );
    state.last_updated = now;

    Settlement {
        is_win,
        new_total,
        distribution,
    }
}
