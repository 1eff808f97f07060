//! One trading cycle across every agent.
//!
//! Each agent goes SCANNING -> DELIBERATING -> DECIDING -> EXECUTING, with a
//! pulse emitted at every step and one per incoming vote. A scanner, decision
//! or execution failure is logged and only ends that agent's turn. Treasury
//! persistence failures end the cycle.

use tracing::{info, warn};

use super::agent::Agent;
use super::error::TreasuryError;
use super::market::{Decision, Direction, Opportunity};
use super::pulse::{Phase, PulseSnapshot};
use super::settlement::{Settlement, Trade};
use super::treasury::Treasury;
use crate::ports::clock_port::Clock;
use crate::ports::market_port::{DecisionMaker, OpportunityScanner, TradeExecutor};
use crate::ports::pulse_port::PulsePort;
use crate::ports::state_port::StatePort;

#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    NoOpportunity {
        agent: Agent,
    },
    Held {
        agent: Agent,
        market: String,
    },
    Blocked {
        agent: Agent,
        market: String,
        reason: String,
    },
    Traded {
        agent: Agent,
        market: String,
        blessing: bool,
        size: f64,
        settlement: Settlement,
    },
    Failed {
        agent: Agent,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub outcomes: Vec<AgentOutcome>,
}

impl CycleReport {
    pub fn trades(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, AgentOutcome::Traded { .. }))
            .count()
    }
}

/// Position size: the decision's suggestion capped at the budget, or the
/// whole budget when no positive suggestion was made.
pub fn position_size(decision: &Decision, budget: f64) -> f64 {
    match decision.suggested_size {
        Some(s) if s > 0.0 => s.min(budget),
        _ => budget,
    }
}

pub struct TradingDesk {
    scanner: Box<dyn OpportunityScanner>,
    decider: Box<dyn DecisionMaker>,
    executor: Box<dyn TradeExecutor>,
    pulse: Box<dyn PulsePort>,
    cycle: u64,
}

impl TradingDesk {
    pub fn new(
        scanner: Box<dyn OpportunityScanner>,
        decider: Box<dyn DecisionMaker>,
        executor: Box<dyn TradeExecutor>,
        pulse: Box<dyn PulsePort>,
    ) -> Self {
        TradingDesk {
            scanner,
            decider,
            executor,
            pulse,
            cycle: 0,
        }
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    fn emit<S: StatePort, C: Clock>(
        &self,
        treasury: &Treasury<S, C>,
        phase: Phase,
        fill: impl FnOnce(&mut PulseSnapshot),
    ) {
        let mut snapshot = PulseSnapshot::new(self.cycle, phase, treasury.summary(), treasury.now());
        fill(&mut snapshot);
        self.pulse.emit(&snapshot);
    }

    fn failed(agent: Agent, stage: &str, err: TreasuryError) -> AgentOutcome {
        warn!(agent = %agent, stage, error = %err, "agent turn failed");
        AgentOutcome::Failed {
            agent,
            error: err.to_string(),
        }
    }

    /// Run every agent once.
    pub fn run_cycle<S: StatePort, C: Clock>(
        &mut self,
        treasury: &mut Treasury<S, C>,
    ) -> Result<CycleReport, TreasuryError> {
        self.cycle += 1;
        let mut outcomes = Vec::with_capacity(Agent::ALL.len());
        for agent in Agent::ALL {
            outcomes.push(self.run_agent(treasury, agent)?);
        }
        self.emit(treasury, Phase::Idle, |_| {});

        let report = CycleReport {
            cycle: self.cycle,
            outcomes,
        };
        info!(
            cycle = report.cycle,
            trades = report.trades(),
            total = treasury.state().balances.total,
            "cycle complete"
        );
        Ok(report)
    }

    fn run_agent<S: StatePort, C: Clock>(
        &mut self,
        treasury: &mut Treasury<S, C>,
        agent: Agent,
    ) -> Result<AgentOutcome, TreasuryError> {
        let agent_name = agent.to_string();
        self.emit(treasury, Phase::Scanning, |p| p.agent = Some(agent_name.clone()));

        let opportunities = match self.scanner.scan(agent) {
            Ok(o) => o,
            Err(e) => return Ok(Self::failed(agent, "scan", e)),
        };
        let Some(opportunity) = opportunities.into_iter().next() else {
            return Ok(AgentOutcome::NoOpportunity { agent });
        };

        let learnings = treasury.shared_learnings();
        let decision = match self.decider.decide(&opportunity, &learnings) {
            Ok(d) => d,
            Err(e) => return Ok(Self::failed(agent, "decide", e)),
        };
        for seen in 1..=decision.votes.len() {
            self.emit(treasury, Phase::Deliberating, |p| {
                p.agent = Some(agent_name.clone());
                p.market = Some(opportunity.market.clone());
                p.votes = decision.votes[..seen].to_vec();
            });
        }

        if decision.direction == Direction::Hold {
            return Ok(AgentOutcome::Held {
                agent,
                market: opportunity.market,
            });
        }

        self.execute(treasury, agent, opportunity, decision)
    }

    fn execute<S: StatePort, C: Clock>(
        &mut self,
        treasury: &mut Treasury<S, C>,
        agent: Agent,
        opportunity: Opportunity,
        decision: Decision,
    ) -> Result<AgentOutcome, TreasuryError> {
        let blessing = treasury.is_blessing(&decision, &opportunity.analysis);
        let budget = treasury.budget_for(agent, blessing);
        let size = position_size(&decision, budget);
        let consensus = decision.consensus();

        self.emit(treasury, Phase::Deciding, |p| {
            p.agent = Some(agent.to_string());
            p.market = Some(opportunity.market.clone());
            p.votes = decision.votes.clone();
            p.consensus = Some(consensus);
            p.blessing = blessing;
            p.decision = Some(format!("{} ${:.2}", decision.direction, size));
        });

        if size <= 0.0 {
            let reason = treasury
                .risk_status()
                .reason()
                .unwrap_or_else(|| format!("{} bucket is empty", agent.bucket()));
            info!(agent = %agent, %reason, "skipping agent");
            return Ok(AgentOutcome::Blocked {
                agent,
                market: opportunity.market,
                reason,
            });
        }

        self.emit(treasury, Phase::Executing, |p| {
            p.agent = Some(agent.to_string());
            p.market = Some(opportunity.market.clone());
            p.consensus = Some(consensus);
            p.blessing = blessing;
            p.decision = Some(format!("{} ${:.2}", decision.direction, size));
        });

        let fill = match self.executor.execute(&opportunity, &decision, size) {
            Ok(f) => f,
            Err(e) => return Ok(Self::failed(agent, "execute", e)),
        };

        let trade = Trade {
            agent,
            pnl: fill.pnl,
            size: fill.size,
            market: opportunity.market.clone(),
            direction: decision.direction,
            confidence: decision.confidence,
            price: opportunity.price,
        };
        let settlement = match treasury.settle(&trade) {
            Ok(s) => s,
            Err(e @ TreasuryError::InvalidAmount { .. }) => return Ok(Self::failed(agent, "settle", e)),
            Err(e) => return Err(e),
        };

        Ok(AgentOutcome::Traded {
            agent,
            market: opportunity.market,
            blessing,
            size,
            settlement,
        })
    }
}
