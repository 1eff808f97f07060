#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use swarmtreasury::domain::agent::Agent;
use swarmtreasury::domain::config::TreasuryConfig;
use swarmtreasury::domain::error::TreasuryError;
use swarmtreasury::domain::learning::{LearningsState, SharedLearnings};
use swarmtreasury::domain::ledger::TreasuryState;
use swarmtreasury::domain::market::{Decision, Direction, Fill, MarketAnalysis, Opportunity, Vote};
use swarmtreasury::domain::pulse::PulseSnapshot;
use swarmtreasury::domain::settlement::Trade;
use swarmtreasury::domain::treasury::Treasury;
use swarmtreasury::ports::clock_port::Clock;
use swarmtreasury::ports::market_port::{DecisionMaker, OpportunityScanner, TradeExecutor};
use swarmtreasury::ports::pulse_port::PulsePort;
use swarmtreasury::ports::state_port::StatePort;

#[derive(Default)]
struct MemoryInner {
    treasury: Option<TreasuryState>,
    learnings: Option<LearningsState>,
    treasury_saves: usize,
    learnings_saves: usize,
    fail_saves: bool,
}

/// In-memory state store. Clones share the same storage so a test can keep a
/// handle after moving one into a `Treasury`.
#[derive(Clone, Default)]
pub struct MemoryStatePort {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStatePort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_treasury(self, state: TreasuryState) -> Self {
        self.inner.borrow_mut().treasury = Some(state);
        self
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.inner.borrow_mut().fail_saves = fail;
    }

    pub fn treasury(&self) -> Option<TreasuryState> {
        self.inner.borrow().treasury.clone()
    }

    pub fn learnings(&self) -> Option<LearningsState> {
        self.inner.borrow().learnings.clone()
    }

    pub fn treasury_saves(&self) -> usize {
        self.inner.borrow().treasury_saves
    }

    pub fn learnings_saves(&self) -> usize {
        self.inner.borrow().learnings_saves
    }

    fn check_fail(&self, file: &str) -> Result<(), TreasuryError> {
        if self.inner.borrow().fail_saves {
            return Err(TreasuryError::Persist {
                file: file.into(),
                reason: "disk full".into(),
            });
        }
        Ok(())
    }
}

impl StatePort for MemoryStatePort {
    fn load_treasury(&self) -> Result<Option<TreasuryState>, TreasuryError> {
        Ok(self.inner.borrow().treasury.clone())
    }

    fn save_treasury(&self, state: &TreasuryState) -> Result<(), TreasuryError> {
        self.check_fail("treasury")?;
        let mut inner = self.inner.borrow_mut();
        inner.treasury = Some(state.clone());
        inner.treasury_saves += 1;
        Ok(())
    }

    fn load_learnings(&self) -> Result<Option<LearningsState>, TreasuryError> {
        Ok(self.inner.borrow().learnings.clone())
    }

    fn save_learnings(&self, state: &LearningsState) -> Result<(), TreasuryError> {
        self.check_fail("learnings")?;
        let mut inner = self.inner.borrow_mut();
        inner.learnings = Some(state.clone());
        inner.learnings_saves += 1;
        Ok(())
    }

    fn reset(&self) -> Result<(), TreasuryError> {
        let mut inner = self.inner.borrow_mut();
        inner.treasury = None;
        inner.learnings = None;
        Ok(())
    }
}

/// Settable clock shared between clones.
#[derive(Clone)]
pub struct FixedClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Wednesday 2026-03-04 14:30 UTC.
pub fn wednesday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, 14, 30, 0).unwrap()
}

pub fn open_treasury(
    config: TreasuryConfig,
    store: &MemoryStatePort,
    clock: &FixedClock,
) -> Treasury<MemoryStatePort, FixedClock> {
    Treasury::open(config, store.clone(), clock.clone()).unwrap()
}

pub fn trade(agent: Agent, pnl: f64) -> Trade {
    Trade {
        agent,
        pnl,
        size: 25.0,
        market: "BTC above 100k by Friday".into(),
        direction: Direction::Buy,
        confidence: 0.75,
        price: 0.42,
    }
}

#[derive(Clone, Default)]
pub struct RecordingPulse {
    pub snapshots: Rc<RefCell<Vec<PulseSnapshot>>>,
}

impl RecordingPulse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<PulseSnapshot> {
        self.snapshots.borrow().clone()
    }
}

impl PulsePort for RecordingPulse {
    fn emit(&self, snapshot: &PulseSnapshot) {
        self.snapshots.borrow_mut().push(snapshot.clone());
    }
}

pub fn opportunity(agent: Agent, market: &str, analysis: MarketAnalysis) -> Opportunity {
    Opportunity {
        agent,
        market: market.into(),
        price: 0.5,
        analysis,
    }
}

pub fn vote(name: &str, direction: Direction, confidence: f64) -> Vote {
    Vote {
        name: name.into(),
        vote: direction,
        confidence,
        reasoning: "scripted".into(),
    }
}

pub fn decision(direction: Direction, confidence: f64, votes: Vec<Vote>) -> Decision {
    Decision {
        confidence,
        direction,
        suggested_size: None,
        votes,
    }
}

/// Returns the configured opportunities for each agent on every scan.
#[derive(Default)]
pub struct ScriptedScanner {
    opportunities: HashMap<Agent, Vec<Opportunity>>,
    failing: HashSet<Agent>,
}

impl ScriptedScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, opp: Opportunity) -> Self {
        self.opportunities.entry(opp.agent).or_default().push(opp);
        self
    }

    pub fn failing_for(mut self, agent: Agent) -> Self {
        self.failing.insert(agent);
        self
    }
}

impl OpportunityScanner for ScriptedScanner {
    fn scan(&mut self, agent: Agent) -> Result<Vec<Opportunity>, TreasuryError> {
        if self.failing.contains(&agent) {
            return Err(TreasuryError::Market {
                agent: agent.to_string(),
                reason: "feed offline".into(),
            });
        }
        Ok(self.opportunities.get(&agent).cloned().unwrap_or_default())
    }
}

/// Same decision for every opportunity of an agent.
#[derive(Default)]
pub struct ScriptedDecider {
    decisions: HashMap<Agent, Decision>,
    pub seen_thresholds: Rc<RefCell<Vec<f64>>>,
}

impl ScriptedDecider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, agent: Agent, decision: Decision) -> Self {
        self.decisions.insert(agent, decision);
        self
    }
}

impl DecisionMaker for ScriptedDecider {
    fn decide(
        &mut self,
        opportunity: &Opportunity,
        learnings: &SharedLearnings,
    ) -> Result<Decision, TreasuryError> {
        self.seen_thresholds
            .borrow_mut()
            .push(learnings.optimal_threshold);
        self.decisions
            .get(&opportunity.agent)
            .cloned()
            .ok_or_else(|| TreasuryError::Market {
                agent: opportunity.agent.to_string(),
                reason: "no scripted decision".into(),
            })
    }
}

/// Fills in order from a queue of P&L values and records requested sizes.
#[derive(Default)]
pub struct ScriptedExecutor {
    pnls: VecDeque<f64>,
    pub sizes: Rc<RefCell<Vec<f64>>>,
}

impl ScriptedExecutor {
    pub fn new(pnls: &[f64]) -> Self {
        Self {
            pnls: pnls.iter().copied().collect(),
            sizes: Rc::default(),
        }
    }
}

impl TradeExecutor for ScriptedExecutor {
    fn execute(
        &mut self,
        opportunity: &Opportunity,
        _decision: &Decision,
        size: f64,
    ) -> Result<Fill, TreasuryError> {
        self.sizes.borrow_mut().push(size);
        let pnl = self.pnls.pop_front().ok_or_else(|| TreasuryError::Market {
            agent: opportunity.agent.to_string(),
            reason: "order rejected".into(),
        })?;
        Ok(Fill { size, pnl })
    }
}
