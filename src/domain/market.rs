//! Opportunity, analysis and decision types exchanged with the market ports.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::agent::Agent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
            Direction::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// Secondary market signals. A missing field means the signal is unknown and
/// never counts toward a blessing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    /// Fractional price change, signed.
    #[serde(default)]
    pub momentum: Option<f64>,
    /// Current volume over baseline volume.
    #[serde(default)]
    pub volume_ratio: Option<f64>,
    /// Bid/ask spread as a fraction of mid.
    #[serde(default)]
    pub spread: Option<f64>,
}

/// A candidate market returned by a scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub agent: Agent,
    pub market: String,
    pub price: f64,
    pub analysis: MarketAnalysis,
}

/// One swarm member's opinion on an opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub name: String,
    pub vote: Direction,
    pub confidence: f64,
    pub reasoning: String,
}

/// Outcome of a deliberation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub confidence: f64,
    pub direction: Direction,
    #[serde(default)]
    pub suggested_size: Option<f64>,
    #[serde(default)]
    pub votes: Vec<Vote>,
}

impl Decision {
    /// Fraction of votes agreeing with the decided direction.
    pub fn consensus(&self) -> f64 {
        if self.votes.is_empty() {
            return 0.0;
        }
        let agreeing = self.votes.iter().filter(|v| v.vote == self.direction).count();
        agreeing as f64 / self.votes.len() as f64
    }
}

/// A trade the executor filled and closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub size: f64,
    pub pnl: f64,
}
