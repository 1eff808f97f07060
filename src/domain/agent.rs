//! Trading agents and the treasury buckets they draw from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::TreasuryError;

/// A named sub-balance within the treasury.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Total,
    PolymarketAgent,
    BaseMemeAgent,
    BluechipAccumulator,
    TreasuryReserve,
    SavingsStaking,
    EmergencyFund,
}

impl Bucket {
    /// Every bucket except `Total`, in allocation order.
    pub const ALLOCATED: [Bucket; 6] = [
        Bucket::PolymarketAgent,
        Bucket::BaseMemeAgent,
        Bucket::BluechipAccumulator,
        Bucket::TreasuryReserve,
        Bucket::SavingsStaking,
        Bucket::EmergencyFund,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Bucket::Total => "total",
            Bucket::PolymarketAgent => "polymarket_agent",
            Bucket::BaseMemeAgent => "base_meme_agent",
            Bucket::BluechipAccumulator => "bluechip_accumulator",
            Bucket::TreasuryReserve => "treasury_reserve",
            Bucket::SavingsStaking => "savings_staking",
            Bucket::EmergencyFund => "emergency_fund",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// An agent that places trades against its own bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agent {
    Polymarket,
    BaseMeme,
}

impl Agent {
    pub const ALL: [Agent; 2] = [Agent::Polymarket, Agent::BaseMeme];

    pub fn bucket(&self) -> Bucket {
        match self {
            Agent::Polymarket => Bucket::PolymarketAgent,
            Agent::BaseMeme => Bucket::BaseMemeAgent,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Agent::Polymarket => "polymarket",
            Agent::BaseMeme => "base_meme",
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Agent {
    type Err = TreasuryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "polymarket" => Ok(Agent::Polymarket),
            "base_meme" | "base-meme" | "basememe" => Ok(Agent::BaseMeme),
            _ => Err(TreasuryError::UnknownAgent {
                name: s.to_string(),
            }),
        }
    }
}
