//! Learning log: which entry conditions preceded wins and losses, and the
//! consensus threshold the swarm should require going forward.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::agent::Agent;
use super::market::Direction;
use super::settlement::Trade;

/// Entries kept per outcome class.
pub const MAX_ENTRIES: usize = 100;
pub const RECENT_WINS: usize = 10;
pub const RECENT_LOSSES: usize = 5;
pub const DEFAULT_CONSENSUS_LEVEL: f64 = 0.7;

pub const TRUSTED_TOKENS: [&str; 7] = ["ETH", "WETH", "USDC", "cbBTC", "AERO", "DEGEN", "BRETT"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

/// Snapshot of the conditions a trade was entered under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryContext {
    pub agent: Agent,
    pub market: String,
    pub direction: Direction,
    pub confidence: f64,
    pub price: f64,
    pub hour: u32,
    pub outcome: Outcome,
    pub pnl: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patterns {
    pub good_entries: Vec<EntryContext>,
    pub bad_entries: Vec<EntryContext>,
    pub best_times: BTreeSet<u32>,
    pub worst_times: BTreeSet<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    pub trades: u64,
    pub wins: u64,
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaboration {
    pub best_consensus_level: f64,
    pub total_decisions: u64,
}

impl Default for Collaboration {
    fn default() -> Self {
        Collaboration {
            best_consensus_level: DEFAULT_CONSENSUS_LEVEL,
            total_decisions: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningsState {
    pub patterns: Patterns,
    pub markets: BTreeMap<String, MarketStats>,
    pub collaboration: Collaboration,
    pub last_updated: DateTime<Utc>,
}

impl LearningsState {
    pub fn new(now: DateTime<Utc>) -> Self {
        LearningsState {
            patterns: Patterns::default(),
            markets: BTreeMap::new(),
            collaboration: Collaboration::default(),
            last_updated: now,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let level = self.collaboration.best_consensus_level;
        if !level.is_finite() || !(0.0..=1.0).contains(&level) {
            return Err("collaboration.bestConsensusLevel out of range".into());
        }
        if let Some(h) = self
            .patterns
            .best_times
            .iter()
            .chain(&self.patterns.worst_times)
            .find(|h| **h > 23)
        {
            return Err(format!("hour {} out of range", h));
        }
        Ok(())
    }
}

fn keep_last(entries: &mut Vec<EntryContext>, limit: usize) {
    if entries.len() > limit {
        let excess = entries.len() - limit;
        entries.drain(..excess);
    }
}

/// Record a settled trade's entry context.
pub fn record(state: &mut LearningsState, trade: &Trade, is_win: bool, now: DateTime<Utc>) {
    let hour = now.hour();
    let context = EntryContext {
        agent: trade.agent,
        market: trade.market.clone(),
        direction: trade.direction,
        confidence: trade.confidence,
        price: trade.price,
        hour,
        outcome: if is_win { Outcome::Win } else { Outcome::Loss },
        pnl: trade.pnl,
        timestamp: now,
    };

    let patterns = &mut state.patterns;
    if is_win {
        patterns.good_entries.push(context);
        keep_last(&mut patterns.good_entries, MAX_ENTRIES);
        patterns.best_times.insert(hour);

        let collab = &mut state.collaboration;
        collab.best_consensus_level = collab.best_consensus_level * 0.9 + trade.confidence * 0.1;
    } else {
        patterns.bad_entries.push(context);
        keep_last(&mut patterns.bad_entries, MAX_ENTRIES);
        patterns.worst_times.insert(hour);
    }

    let market = state.markets.entry(trade.market.clone()).or_default();
    market.trades += 1;
    market.pnl += trade.pnl;
    if is_win {
        market.wins += 1;
    }

    state.collaboration.total_decisions += 1;
    state.last_updated = now;
}

/// Read-only advisory view handed to the decision makers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedLearnings {
    pub optimal_threshold: f64,
    pub best_hours: Vec<u32>,
    pub avoid_hours: Vec<u32>,
    pub trusted_tokens: Vec<String>,
    pub recent_wins: Vec<EntryContext>,
    pub recent_losses: Vec<EntryContext>,
}

fn last_n(entries: &[EntryContext], n: usize) -> Vec<EntryContext> {
    entries[entries.len().saturating_sub(n)..].to_vec()
}

pub fn shared_learnings(state: &LearningsState) -> SharedLearnings {
    SharedLearnings {
        optimal_threshold: state.collaboration.best_consensus_level,
        best_hours: state.patterns.best_times.iter().copied().collect(),
        avoid_hours: state.patterns.worst_times.iter().copied().collect(),
        trusted_tokens: TRUSTED_TOKENS.iter().map(|t| t.to_string()).collect(),
        recent_wins: last_n(&state.patterns.good_entries, RECENT_WINS),
        recent_losses: last_n(&state.patterns.bad_entries, RECENT_LOSSES),
    }
}
