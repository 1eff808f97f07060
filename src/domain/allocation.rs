//! Bucket allocation from total capital.
//!
//! Each trading agent's base share is nudged by `(win_rate - 0.5) *
//! performance_weight`. The nudge is taken from or added to that agent's share
//! only, so bucket totals may drift slightly off `total` when win rates are not
//! 0.5. The drift is corrected on the next allocation pass.

use std::collections::BTreeMap;

use super::agent::{Agent, Bucket};
use super::config::AllocationPolicy;
use super::ledger::Balances;

/// Share of total capital for an agent at the given trailing win rate.
/// Win rates are not range-checked.
pub fn agent_share(agent: Agent, win_rate: f64, policy: &AllocationPolicy) -> f64 {
    let base = match agent {
        Agent::Polymarket => policy.polymarket_pct,
        Agent::BaseMeme => policy.base_meme_pct,
    };
    base + (win_rate - 0.5) * policy.performance_weight
}

/// Recompute every bucket from `total`. Agents missing from `win_rates` are
/// treated as neutral (0.5).
pub fn allocate(total: f64, win_rates: &BTreeMap<Agent, f64>, policy: &AllocationPolicy) -> Balances {
    let mut balances = Balances {
        total,
        ..Default::default()
    };

    for agent in Agent::ALL {
        let rate = win_rates.get(&agent).copied().unwrap_or(0.5);
        balances.set(agent.bucket(), total * agent_share(agent, rate, policy));
    }

    balances.set(Bucket::BluechipAccumulator, total * policy.bluechip_pct);
    balances.set(Bucket::TreasuryReserve, total * policy.treasury_reserve_pct);
    balances.set(Bucket::SavingsStaking, total * policy.savings_staking_pct);
    balances.set(Bucket::EmergencyFund, total * policy.emergency_fund_pct);

    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rates(poly: f64, meme: f64) -> BTreeMap<Agent, f64> {
        BTreeMap::from([(Agent::Polymarket, poly), (Agent::BaseMeme, meme)])
    }

    #[test]
    fn neutral_win_rates_use_base_split() {
        let b = allocate(300.0, &rates(0.5, 0.5), &AllocationPolicy::default());
        assert_relative_eq!(b.total, 300.0);
        assert_relative_eq!(b.polymarket_agent, 90.0);
        assert_relative_eq!(b.base_meme_agent, 75.0);
        assert_relative_eq!(b.bluechip_accumulator, 45.0);
        assert_relative_eq!(b.treasury_reserve, 45.0);
        assert_relative_eq!(b.savings_staking, 30.0);
        assert_relative_eq!(b.emergency_fund, 15.0);
        assert_relative_eq!(b.bucket_sum(), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn missing_agents_are_neutral() {
        let b = allocate(1000.0, &BTreeMap::new(), &AllocationPolicy::default());
        assert_relative_eq!(b.polymarket_agent, 300.0);
        assert_relative_eq!(b.base_meme_agent, 250.0);
    }

    #[test]
    fn perfect_win_rate_adds_five_points() {
        let b = allocate(1000.0, &rates(1.0, 0.0), &AllocationPolicy::default());
        assert_relative_eq!(b.polymarket_agent, 350.0, epsilon = 1e-9);
        assert_relative_eq!(b.base_meme_agent, 200.0, epsilon = 1e-9);
        // Other buckets are untouched by the adjustment.
        assert_relative_eq!(b.treasury_reserve, 150.0);
    }

    #[test]
    fn adjustment_is_not_rebalanced() {
        let b = allocate(1000.0, &rates(1.0, 1.0), &AllocationPolicy::default());
        assert_relative_eq!(b.drift(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_total_gives_zero_buckets() {
        let b = allocate(0.0, &rates(0.9, 0.1), &AllocationPolicy::default());
        assert_eq!(b.bucket_sum(), 0.0);
    }
}
