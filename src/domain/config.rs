//! Treasury configuration: allocation split, risk limits, blessing rules,
//! win distribution, harvest threshold, paper loop and file locations.

use std::path::PathBuf;

/// Base share of total capital per bucket. Sums to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPolicy {
    pub polymarket_pct: f64,
    pub base_meme_pct: f64,
    pub bluechip_pct: f64,
    pub treasury_reserve_pct: f64,
    pub savings_staking_pct: f64,
    pub emergency_fund_pct: f64,
    /// Share shift per unit of win rate away from 0.5.
    pub performance_weight: f64,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        AllocationPolicy {
            polymarket_pct: 0.30,
            base_meme_pct: 0.25,
            bluechip_pct: 0.15,
            treasury_reserve_pct: 0.15,
            savings_staking_pct: 0.10,
            emergency_fund_pct: 0.05,
            performance_weight: 0.10,
        }
    }
}

impl AllocationPolicy {
    pub fn base_sum(&self) -> f64 {
        self.polymarket_pct
            + self.base_meme_pct
            + self.bluechip_pct
            + self.treasury_reserve_pct
            + self.savings_staking_pct
            + self.emergency_fund_pct
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskLimits {
    pub daily_loss_limit: f64,
    pub drawdown_pause_pct: f64,
    pub max_trade: f64,
    pub blessing_max_trade: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        RiskLimits {
            daily_loss_limit: 50.0,
            drawdown_pause_pct: 0.15,
            max_trade: 25.0,
            blessing_max_trade: 75.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlessingRules {
    pub min_confidence: f64,
    pub min_momentum: f64,
    pub min_volume_ratio: f64,
    pub max_spread: f64,
    pub min_signals: usize,
}

impl Default for BlessingRules {
    fn default() -> Self {
        BlessingRules {
            min_confidence: 0.80,
            min_momentum: 0.15,
            min_volume_ratio: 2.0,
            max_spread: 0.02,
            min_signals: 2,
        }
    }
}

/// Split applied to a winning trade's profit. Sums to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionPolicy {
    pub reinvest_pct: f64,
    pub treasury_pct: f64,
    pub savings_pct: f64,
    pub bluechip_pct: f64,
    /// Keep the raw P&L in the agent bucket on top of the reinvest share.
    pub double_credit: bool,
}

impl Default for DistributionPolicy {
    fn default() -> Self {
        DistributionPolicy {
            reinvest_pct: 0.40,
            treasury_pct: 0.30,
            savings_pct: 0.20,
            bluechip_pct: 0.10,
            double_credit: true,
        }
    }
}

impl DistributionPolicy {
    pub fn split_sum(&self) -> f64 {
        self.reinvest_pct + self.treasury_pct + self.savings_pct + self.bluechip_pct
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarvestPolicy {
    pub min_reserve_pct: f64,
    pub min_harvest: f64,
}

impl Default for HarvestPolicy {
    fn default() -> Self {
        HarvestPolicy {
            min_reserve_pct: 0.20,
            min_harvest: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaperSettings {
    pub cycle_interval_secs: u64,
    pub members: Vec<String>,
    pub seed: Option<u64>,
}

impl Default for PaperSettings {
    fn default() -> Self {
        PaperSettings {
            cycle_interval_secs: 60,
            members: ["b0b", "c0m", "d0t", "r0ss"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatePaths {
    pub treasury_file: PathBuf,
    pub learnings_file: PathBuf,
    pub pulse_file: PathBuf,
}

impl Default for StatePaths {
    fn default() -> Self {
        let dir = PathBuf::from("data");
        StatePaths {
            treasury_file: dir.join("treasury-state.json"),
            learnings_file: dir.join("swarm-learnings.json"),
            pulse_file: dir.join("swarm-pulse.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreasuryConfig {
    pub initial_capital: f64,
    pub history_limit: usize,
    pub paths: StatePaths,
    pub allocation: AllocationPolicy,
    pub risk: RiskLimits,
    pub blessing: BlessingRules,
    pub distribution: DistributionPolicy,
    pub harvest: HarvestPolicy,
    pub paper: PaperSettings,
}

impl Default for TreasuryConfig {
    fn default() -> Self {
        TreasuryConfig {
            initial_capital: 300.0,
            history_limit: 500,
            paths: StatePaths::default(),
            allocation: AllocationPolicy::default(),
            risk: RiskLimits::default(),
            blessing: BlessingRules::default(),
            distribution: DistributionPolicy::default(),
            harvest: HarvestPolicy::default(),
            paper: PaperSettings::default(),
        }
    }
}
