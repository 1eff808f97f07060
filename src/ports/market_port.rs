//! Market-facing ports: scanning, deliberation and execution.

use crate::domain::agent::Agent;
use crate::domain::error::TreasuryError;
use crate::domain::learning::SharedLearnings;
use crate::domain::market::{Decision, Fill, Opportunity};

pub trait OpportunityScanner {
    fn scan(&mut self, agent: Agent) -> Result<Vec<Opportunity>, TreasuryError>;
}

pub trait DecisionMaker {
    fn decide(
        &mut self,
        opportunity: &Opportunity,
        learnings: &SharedLearnings,
    ) -> Result<Decision, TreasuryError>;
}

pub trait TradeExecutor {
    fn execute(
        &mut self,
        opportunity: &Opportunity,
        decision: &Decision,
        size: f64,
    ) -> Result<Fill, TreasuryError>;
}
