//! Balance ledger: bucket balances, performance counters, period
//! accumulators, per-agent statistics and the bounded event history.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::agent::{Agent, Bucket};

/// Current capital split across named buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    pub total: f64,
    pub polymarket_agent: f64,
    pub base_meme_agent: f64,
    pub bluechip_accumulator: f64,
    pub treasury_reserve: f64,
    pub savings_staking: f64,
    pub emergency_fund: f64,
}

impl Balances {
    pub fn get(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::Total => self.total,
            Bucket::PolymarketAgent => self.polymarket_agent,
            Bucket::BaseMemeAgent => self.base_meme_agent,
            Bucket::BluechipAccumulator => self.bluechip_accumulator,
            Bucket::TreasuryReserve => self.treasury_reserve,
            Bucket::SavingsStaking => self.savings_staking,
            Bucket::EmergencyFund => self.emergency_fund,
        }
    }

    fn slot(&mut self, bucket: Bucket) -> &mut f64 {
        match bucket {
            Bucket::Total => &mut self.total,
            Bucket::PolymarketAgent => &mut self.polymarket_agent,
            Bucket::BaseMemeAgent => &mut self.base_meme_agent,
            Bucket::BluechipAccumulator => &mut self.bluechip_accumulator,
            Bucket::TreasuryReserve => &mut self.treasury_reserve,
            Bucket::SavingsStaking => &mut self.savings_staking,
            Bucket::EmergencyFund => &mut self.emergency_fund,
        }
    }

    /// Add `amount` (may be negative) to a bucket.
    pub fn credit(&mut self, bucket: Bucket, amount: f64) {
        *self.slot(bucket) += amount;
    }

    pub fn set(&mut self, bucket: Bucket, amount: f64) {
        *self.slot(bucket) = amount;
    }

    /// Sum of every bucket except `total`.
    pub fn bucket_sum(&self) -> f64 {
        Bucket::ALLOCATED.iter().map(|b| self.get(*b)).sum()
    }

    /// Difference between the bucket sum and `total`.
    pub fn drift(&self) -> f64 {
        self.bucket_sum() - self.total
    }
}

/// A single settled trade, kept for best/worst tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub agent: Agent,
    pub market: String,
    pub pnl: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub total_deposits: f64,
    pub total_withdrawals: f64,
    pub total_pnl: f64,
    pub total_wins: f64,
    pub total_losses: f64,
    pub win_count: u64,
    pub loss_count: u64,
    pub best_trade: Option<TradeRecord>,
    pub worst_trade: Option<TradeRecord>,
}

impl Performance {
    pub fn trade_count(&self) -> u64 {
        self.win_count + self.loss_count
    }

    pub fn win_rate(&self) -> f64 {
        let n = self.trade_count();
        if n == 0 {
            0.0
        } else {
            self.win_count as f64 / n as f64
        }
    }

    /// Cumulative P&L as a fraction of deposits, `None` with no deposits.
    pub fn drawdown(&self) -> Option<f64> {
        if self.total_deposits > 0.0 {
            Some(self.total_pnl / self.total_deposits)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub pnl: f64,
    pub trades: u64,
    pub wins: u64,
    pub losses: u64,
}

impl DailyStats {
    pub fn new(date: NaiveDate) -> Self {
        DailyStats {
            date,
            pnl: 0.0,
            trades: 0,
            wins: 0,
            losses: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub week_start: NaiveDate,
    pub pnl: f64,
    pub trades: u64,
    pub savings_contributed: f64,
    pub bluechip_dca: f64,
}

impl WeeklyStats {
    pub fn new(week_start: NaiveDate) -> Self {
        WeeklyStats {
            week_start,
            pnl: 0.0,
            trades: 0,
            savings_contributed: 0.0,
            bluechip_dca: 0.0,
        }
    }
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStats {
    pub trades: u64,
    pub pnl: f64,
    pub win_rate: f64,
}

impl Default for AgentStats {
    fn default() -> Self {
        AgentStats {
            trades: 0,
            pnl: 0.0,
            win_rate: 0.5,
        }
    }
}

impl AgentStats {
    /// Fold one trade into the rolling win rate: `(old * (n - 1) + win) / n`.
    pub fn record(&mut self, pnl: f64, is_win: bool) {
        self.trades += 1;
        self.pnl += pnl;
        let n = self.trades as f64;
        let outcome = if is_win { 1.0 } else { 0.0 };
        self.win_rate = (self.win_rate * (n - 1.0) + outcome) / n;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Trade,
    Harvest,
    Deposit,
    Withdrawal,
    Allocation,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Trade => "trade",
            HistoryKind::Harvest => "harvest",
            HistoryKind::Deposit => "deposit",
            HistoryKind::Withdrawal => "withdrawal",
            HistoryKind::Allocation => "allocation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<Agent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    pub amount: f64,
    /// Grand total after the event.
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasuryState {
    pub balances: Balances,
    pub performance: Performance,
    pub daily: DailyStats,
    pub weekly: WeeklyStats,
    pub agent_stats: BTreeMap<Agent, AgentStats>,
    pub history: Vec<HistoryEntry>,
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl TreasuryState {
    /// Fresh state holding `initial_capital` in `total`. Buckets stay at zero
    /// until the first allocation pass.
    pub fn new(initial_capital: f64, now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let agent_stats = Agent::ALL
            .iter()
            .map(|a| (*a, AgentStats::default()))
            .collect();
        TreasuryState {
            balances: Balances {
                total: initial_capital,
                ..Default::default()
            },
            performance: Performance {
                total_deposits: initial_capital,
                ..Default::default()
            },
            daily: DailyStats::new(today),
            weekly: WeeklyStats::new(week_start(today)),
            agent_stats,
            history: Vec::new(),
            created: now,
            last_updated: now,
        }
    }

    /// Reset the daily/weekly accumulators when `now` has crossed into a new
    /// day or ISO week. Returns true if anything was reset.
    pub fn roll_periods(&mut self, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        let mut rolled = false;
        if self.daily.date != today {
            self.daily = DailyStats::new(today);
            rolled = true;
        }
        let monday = week_start(today);
        if self.weekly.week_start != monday {
            self.weekly = WeeklyStats::new(monday);
            rolled = true;
        }
        rolled
    }

    pub fn agent_stats(&self, agent: Agent) -> AgentStats {
        self.agent_stats.get(&agent).cloned().unwrap_or_default()
    }

    pub fn win_rate(&self, agent: Agent) -> f64 {
        self.agent_stats(agent).win_rate
    }

    /// Append a history entry, evicting the oldest beyond `limit`.
    pub fn push_history(&mut self, entry: HistoryEntry, limit: usize) {
        self.history.push(entry);
        if self.history.len() > limit {
            let excess = self.history.len() - limit;
            self.history.drain(..excess);
        }
    }

    /// Reject states whose numbers cannot be used in arithmetic.
    pub fn validate(&self) -> Result<(), String> {
        for bucket in std::iter::once(Bucket::Total).chain(Bucket::ALLOCATED) {
            let value = self.balances.get(bucket);
            if !value.is_finite() {
                return Err(format!("balance {} is not finite", bucket));
            }
        }
        let perf = &self.performance;
        for (name, value) in [
            ("totalDeposits", perf.total_deposits),
            ("totalWithdrawals", perf.total_withdrawals),
            ("totalPnl", perf.total_pnl),
            ("totalWins", perf.total_wins),
            ("totalLosses", perf.total_losses),
        ] {
            if !value.is_finite() {
                return Err(format!("performance.{} is not finite", name));
            }
        }
        if perf.total_deposits < 0.0 {
            return Err("performance.totalDeposits is negative".into());
        }
        for (agent, stats) in &self.agent_stats {
            if !(0.0..=1.0).contains(&stats.win_rate) {
                return Err(format!("agentStats.{}.winRate out of range", agent));
            }
        }
        Ok(())
    }
}
