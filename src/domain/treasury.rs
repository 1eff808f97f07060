//! Treasury facade: owns the ledger and learnings, applies the domain rules,
//! and persists after every mutating call.
//!
//! Persistence and time are injected so several instances can coexist (tests
//! in particular). Running two processes against the same files is not
//! supported: the last writer wins.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::agent::Agent;
use super::allocation;
use super::blessing::{self, BlessingVerdict};
use super::config::TreasuryConfig;
use super::error::TreasuryError;
use super::harvest;
use super::learning::{self, LearningsState, SharedLearnings};
use super::ledger::{Balances, HistoryEntry, HistoryKind, TreasuryState};
use super::market::{Decision, MarketAnalysis};
use super::pulse::TreasurySummary;
use super::risk::{self, RiskStatus};
use super::settlement::{self, Settlement, Trade};
use crate::ports::clock_port::Clock;
use crate::ports::state_port::StatePort;

pub struct Treasury<S: StatePort, C: Clock> {
    config: TreasuryConfig,
    store: S,
    clock: C,
    state: TreasuryState,
    learnings: LearningsState,
}

impl<S: StatePort, C: Clock> Treasury<S, C> {
    /// Load persisted state, or create and persist a freshly allocated
    /// default when none exists. Corrupt documents fail fast.
    pub fn open(config: TreasuryConfig, store: S, clock: C) -> Result<Self, TreasuryError> {
        let now = clock.now();

        let loaded = store.load_treasury()?;
        let fresh = loaded.is_none();
        let state = loaded.unwrap_or_else(|| TreasuryState::new(config.initial_capital, now));
        state
            .validate()
            .map_err(|reason| TreasuryError::StateCorrupt {
                file: "treasury state".into(),
                reason,
            })?;

        let learnings = store
            .load_learnings()?
            .unwrap_or_else(|| LearningsState::new(now));
        learnings
            .validate()
            .map_err(|reason| TreasuryError::StateCorrupt {
                file: "learnings".into(),
                reason,
            })?;

        let mut treasury = Treasury {
            config,
            store,
            clock,
            state,
            learnings,
        };

        if fresh {
            info!(
                capital = treasury.state.balances.total,
                "initializing treasury with default allocation"
            );
            treasury.allocate()?;
        } else if treasury.state.roll_periods(now) {
            debug!("period accumulators rolled over");
            treasury.store.save_treasury(&treasury.state)?;
        }

        Ok(treasury)
    }

    pub fn state(&self) -> &TreasuryState {
        &self.state
    }

    pub fn learnings(&self) -> &LearningsState {
        &self.learnings
    }

    pub fn config(&self) -> &TreasuryConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn summary(&self) -> TreasurySummary {
        TreasurySummary::from_state(&self.state)
    }

    /// Apply `change` to a copy of the ledger and keep it only once the copy
    /// is persisted. A failed save leaves the in-memory state untouched.
    fn commit<T>(&mut self, change: impl FnOnce(&mut TreasuryState) -> T) -> Result<T, TreasuryError> {
        let mut next = self.state.clone();
        let out = change(&mut next);
        self.store.save_treasury(&next)?;
        self.state = next;
        Ok(out)
    }

    fn reallocate(state: &mut TreasuryState, config: &TreasuryConfig, now: DateTime<Utc>) {
        let total = state.balances.total;
        let win_rates: BTreeMap<Agent, f64> = Agent::ALL.iter().map(|a| (*a, state.win_rate(*a))).collect();
        state.balances = allocation::allocate(total, &win_rates, &config.allocation);
        state.push_history(
            HistoryEntry {
                timestamp: now,
                kind: HistoryKind::Allocation,
                agent: None,
                market: None,
                amount: total,
                balance: total,
            },
            config.history_limit,
        );
        state.last_updated = now;
    }

    /// Recompute every bucket from `total` and the agents' win rates.
    pub fn allocate(&mut self) -> Result<&Balances, TreasuryError> {
        let now = self.clock.now();
        let config = &self.config;
        let mut next = self.state.clone();
        Self::reallocate(&mut next, config, now);
        self.store.save_treasury(&next)?;
        self.state = next;
        info!(total = self.state.balances.total, "buckets reallocated");
        Ok(&self.state.balances)
    }

    pub fn risk_status(&mut self) -> RiskStatus {
        self.state.roll_periods(self.clock.now());
        risk::risk_status(&self.state, &self.config.risk)
    }

    /// Advisory per-trade budget for `agent`.
    pub fn budget_for(&mut self, agent: Agent, is_blessing: bool) -> f64 {
        self.state.roll_periods(self.clock.now());
        risk::budget_for(&self.state, agent, is_blessing, &self.config.risk)
    }

    pub fn blessing_verdict(&self, decision: &Decision, analysis: &MarketAnalysis) -> BlessingVerdict {
        blessing::evaluate(decision, analysis, &self.config.blessing)
    }

    pub fn is_blessing(&self, decision: &Decision, analysis: &MarketAnalysis) -> bool {
        blessing::is_blessing(decision, analysis, &self.config.blessing)
    }

    /// Every number a trade carries ends up in a persisted document, and
    /// JSON has no NaN.
    fn check_trade(trade: &Trade) -> Result<(), TreasuryError> {
        let invalid = |amount: f64, reason: &str| TreasuryError::InvalidAmount {
            amount,
            reason: reason.into(),
        };
        if !trade.pnl.is_finite() {
            return Err(invalid(trade.pnl, "trade P&L must be finite"));
        }
        if !trade.size.is_finite() || trade.size < 0.0 {
            return Err(invalid(trade.size, "trade size must be a non-negative number"));
        }
        if !trade.price.is_finite() {
            return Err(invalid(trade.price, "trade price must be finite"));
        }
        if !(0.0..=1.0).contains(&trade.confidence) {
            return Err(invalid(trade.confidence, "trade confidence must be between 0 and 1"));
        }
        Ok(())
    }

    /// Apply a completed trade, persist, then record what preceded it.
    pub fn settle(&mut self, trade: &Trade) -> Result<Settlement, TreasuryError> {
        Self::check_trade(trade)?;
        let now = self.clock.now();
        let distribution = self.config.distribution.clone();
        let history_limit = self.config.history_limit;
        let result = self.commit(|state| settlement::settle(state, trade, now, &distribution, history_limit))?;

        let mut learnings = self.learnings.clone();
        learning::record(&mut learnings, trade, result.is_win, now);
        self.store.save_learnings(&learnings)?;
        self.learnings = learnings;

        info!(
            agent = %trade.agent,
            market = %trade.market,
            pnl = trade.pnl,
            win = result.is_win,
            total = result.new_total,
            "trade settled"
        );
        Ok(result)
    }

    /// Sweep excess reserve into savings. Persists only when funds moved.
    pub fn harvest(&mut self) -> Result<f64, TreasuryError> {
        let now = self.clock.now();
        let mut next = self.state.clone();
        let moved = harvest::harvest(&mut next, &self.config.harvest, now, self.config.history_limit);
        if moved > 0.0 {
            self.store.save_treasury(&next)?;
            self.state = next;
            info!(amount = moved, "harvested reserve into savings");
        } else {
            debug!("reserve at or below retention floor, nothing harvested");
        }
        Ok(moved)
    }

    fn check_amount(amount: f64) -> Result<(), TreasuryError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(TreasuryError::InvalidAmount {
                amount,
                reason: "amount must be a positive number".into(),
            });
        }
        Ok(())
    }

    /// Move capital in (`signed > 0`) or out, log the flow, then reallocate.
    fn apply_flow(&mut self, kind: HistoryKind, amount: f64, signed: f64) -> Result<f64, TreasuryError> {
        let now = self.clock.now();
        let config = self.config.clone();
        let total = self.commit(|state| {
            state.balances.total += signed;
            if signed > 0.0 {
                state.performance.total_deposits += amount;
            } else {
                state.performance.total_withdrawals += amount;
            }
            state.push_history(
                HistoryEntry {
                    timestamp: now,
                    kind,
                    agent: None,
                    market: None,
                    amount,
                    balance: state.balances.total,
                },
                config.history_limit,
            );
            Self::reallocate(state, &config, now);
            state.balances.total
        })?;
        info!(kind = kind.as_str(), amount, total, "capital flow applied");
        Ok(total)
    }

    /// Add capital and reallocate. Returns the new total.
    pub fn deposit(&mut self, amount: f64) -> Result<f64, TreasuryError> {
        Self::check_amount(amount)?;
        self.apply_flow(HistoryKind::Deposit, amount, amount)
    }

    /// Remove capital and reallocate. Returns the new total.
    pub fn withdraw(&mut self, amount: f64) -> Result<f64, TreasuryError> {
        Self::check_amount(amount)?;
        let available = self.state.balances.total;
        if amount > available {
            return Err(TreasuryError::InsufficientFunds {
                bucket: "total".into(),
                available,
                requested: amount,
            });
        }
        self.apply_flow(HistoryKind::Withdrawal, amount, -amount)
    }

    pub fn shared_learnings(&self) -> SharedLearnings {
        learning::shared_learnings(&self.learnings)
    }
}
