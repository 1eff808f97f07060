//! Risk gate: whether an agent may trade and how large a single trade may be.
//!
//! The returned budget is advisory. Callers are expected to size orders at or
//! below it; nothing here enforces that.

use super::agent::Agent;
use super::config::RiskLimits;
use super::ledger::TreasuryState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiskStatus {
    Clear,
    DailyLossLimit { daily_pnl: f64, limit: f64 },
    DrawdownPause { drawdown: f64, limit: f64 },
}

impl RiskStatus {
    pub fn is_clear(&self) -> bool {
        matches!(self, RiskStatus::Clear)
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            RiskStatus::Clear => None,
            RiskStatus::DailyLossLimit { daily_pnl, limit } => Some(format!(
                "daily loss limit hit (P&L {:.2} <= -{:.2})",
                daily_pnl, limit
            )),
            RiskStatus::DrawdownPause { drawdown, limit } => Some(format!(
                "drawdown pause ({:.1}% <= -{:.1}%)",
                drawdown * 100.0,
                limit * 100.0
            )),
        }
    }
}

/// Check the circuit breakers that apply to every agent.
pub fn risk_status(state: &TreasuryState, limits: &RiskLimits) -> RiskStatus {
    if state.daily.pnl <= -limits.daily_loss_limit {
        return RiskStatus::DailyLossLimit {
            daily_pnl: state.daily.pnl,
            limit: limits.daily_loss_limit,
        };
    }
    if let Some(drawdown) = state.performance.drawdown() {
        if drawdown <= -limits.drawdown_pause_pct {
            return RiskStatus::DrawdownPause {
                drawdown,
                limit: limits.drawdown_pause_pct,
            };
        }
    }
    RiskStatus::Clear
}

/// Per-trade cap for the agent: `min(bucket, cap)`, or zero when a circuit
/// breaker is tripped. Never negative.
pub fn budget_for(state: &TreasuryState, agent: Agent, is_blessing: bool, limits: &RiskLimits) -> f64 {
    if !risk_status(state, limits).is_clear() {
        return 0.0;
    }
    let cap = if is_blessing {
        limits.blessing_max_trade
    } else {
        limits.max_trade
    };
    state.balances.get(agent.bucket()).min(cap).max(0.0)
}
