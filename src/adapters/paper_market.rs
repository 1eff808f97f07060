//! Simulated market for paper trading.
//!
//! The scanner invents opportunities, the swarm votes at random with a bias
//! toward the opportunity's momentum, and the executor settles each position
//! with a coin flip weighted by the decision's confidence. Passing the same
//! seed reproduces a run exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::agent::Agent;
use crate::domain::error::TreasuryError;
use crate::domain::learning::SharedLearnings;
use crate::domain::market::{Decision, Direction, Fill, MarketAnalysis, Opportunity, Vote};
use crate::ports::market_port::{DecisionMaker, OpportunityScanner, TradeExecutor};

const POLYMARKET_MARKETS: [&str; 5] = [
    "Fed cuts rates in June",
    "BTC above 100k by Friday",
    "ETH ETF net inflows this week",
    "Base TVL new high this month",
    "US CPI prints below 3%",
];

const BASE_MEME_MARKETS: [&str; 5] = ["DEGEN/WETH", "BRETT/WETH", "AERO/USDC", "TOSHI/WETH", "HIGHER/WETH"];

/// Chance a scan finds nothing worth looking at.
const EMPTY_SCAN: f64 = 0.2;
const HOLD_VOTE: f64 = 0.2;

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

pub struct PaperScanner {
    rng: StdRng,
}

impl PaperScanner {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: make_rng(seed) }
    }

    fn market_for(&mut self, agent: Agent) -> (String, f64) {
        match agent {
            Agent::Polymarket => {
                let i = self.rng.gen_range(0..POLYMARKET_MARKETS.len());
                (POLYMARKET_MARKETS[i].to_string(), self.rng.gen_range(0.05..0.95))
            }
            Agent::BaseMeme => {
                let i = self.rng.gen_range(0..BASE_MEME_MARKETS.len());
                (BASE_MEME_MARKETS[i].to_string(), self.rng.gen_range(0.0001..0.05))
            }
        }
    }
}

impl OpportunityScanner for PaperScanner {
    fn scan(&mut self, agent: Agent) -> Result<Vec<Opportunity>, TreasuryError> {
        if self.rng.gen_bool(EMPTY_SCAN) {
            return Ok(Vec::new());
        }
        let (market, price) = self.market_for(agent);
        let analysis = MarketAnalysis {
            momentum: Some(self.rng.gen_range(-0.10..0.10)),
            volume_ratio: Some(self.rng.gen_range(0.5..4.0)),
            spread: Some(self.rng.gen_range(0.005..0.05)),
        };
        Ok(vec![Opportunity {
            agent,
            market,
            price,
            analysis,
        }])
    }
}

pub struct PaperDecisionMaker {
    members: Vec<String>,
    rng: StdRng,
}

impl PaperDecisionMaker {
    pub fn new(members: Vec<String>, seed: Option<u64>) -> Self {
        Self {
            members,
            rng: make_rng(seed),
        }
    }

    fn cast(&mut self, name: &str, momentum: f64) -> Vote {
        let buy_bias = (0.5 + momentum * 3.0).clamp(0.1, 0.9);
        let vote = if self.rng.gen_bool(HOLD_VOTE) {
            Direction::Hold
        } else if self.rng.gen_bool(buy_bias) {
            Direction::Buy
        } else {
            Direction::Sell
        };
        let confidence = self.rng.gen_range(0.5..0.95);
        Vote {
            name: name.to_string(),
            vote,
            confidence,
            reasoning: format!("momentum {:+.1}%", momentum * 100.0),
        }
    }
}

/// Majority direction; ties go to `Hold`.
fn majority(votes: &[Vote]) -> Direction {
    let count = |d: Direction| votes.iter().filter(|v| v.vote == d).count();
    let (buy, sell, hold) = (count(Direction::Buy), count(Direction::Sell), count(Direction::Hold));
    if buy > sell && buy > hold {
        Direction::Buy
    } else if sell > buy && sell > hold {
        Direction::Sell
    } else {
        Direction::Hold
    }
}

impl DecisionMaker for PaperDecisionMaker {
    fn decide(
        &mut self,
        opportunity: &Opportunity,
        learnings: &SharedLearnings,
    ) -> Result<Decision, TreasuryError> {
        if self.members.is_empty() {
            return Err(TreasuryError::Market {
                agent: opportunity.agent.to_string(),
                reason: "no swarm members to vote".into(),
            });
        }
        let momentum = opportunity.analysis.momentum.unwrap_or(0.0);
        let members = self.members.clone();
        let votes: Vec<Vote> = members.iter().map(|m| self.cast(m, momentum)).collect();

        let mut decision = Decision {
            confidence: 0.0,
            direction: majority(&votes),
            suggested_size: None,
            votes,
        };
        let agreeing: Vec<f64> = decision
            .votes
            .iter()
            .filter(|v| v.vote == decision.direction)
            .map(|v| v.confidence)
            .collect();
        if !agreeing.is_empty() {
            decision.confidence = agreeing.iter().sum::<f64>() / agreeing.len() as f64;
        }
        if decision.direction != Direction::Hold && decision.consensus() < learnings.optimal_threshold {
            decision.direction = Direction::Hold;
        }
        Ok(decision)
    }
}

pub struct PaperExecutor {
    rng: StdRng,
}

impl PaperExecutor {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: make_rng(seed) }
    }
}

impl TradeExecutor for PaperExecutor {
    fn execute(
        &mut self,
        _opportunity: &Opportunity,
        decision: &Decision,
        size: f64,
    ) -> Result<Fill, TreasuryError> {
        let p_win = if decision.confidence.is_finite() {
            decision.confidence.clamp(0.05, 0.95)
        } else {
            0.5
        };
        let pnl = if self.rng.gen_bool(p_win) {
            size * self.rng.gen_range(0.05..0.40)
        } else {
            -size * self.rng.gen_range(0.05..0.30)
        };
        Ok(Fill { size, pnl })
    }
}
