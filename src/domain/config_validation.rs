//! Configuration validation.
//!
//! Runs on the assembled [`TreasuryConfig`] so defaults and file values are
//! checked the same way.

use crate::domain::config::TreasuryConfig;
use crate::domain::error::TreasuryError;

const SUM_TOLERANCE: f64 = 1e-9;

pub fn validate_treasury_config(config: &TreasuryConfig) -> Result<(), TreasuryError> {
    validate_treasury_section(config)?;
    validate_allocation(config)?;
    validate_risk(config)?;
    validate_blessing(config)?;
    validate_distribution(config)?;
    validate_harvest(config)?;
    validate_paper(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> TreasuryError {
    TreasuryError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn check_fraction(section: &str, key: &str, value: f64) -> Result<(), TreasuryError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(section, key, &format!("{} must be between 0 and 1", key)));
    }
    Ok(())
}

fn check_non_negative(section: &str, key: &str, value: f64) -> Result<(), TreasuryError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(section, key, &format!("{} must be non-negative", key)));
    }
    Ok(())
}

fn validate_treasury_section(config: &TreasuryConfig) -> Result<(), TreasuryError> {
    if !config.initial_capital.is_finite() || config.initial_capital <= 0.0 {
        return Err(invalid(
            "treasury",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    if config.history_limit == 0 {
        return Err(invalid(
            "treasury",
            "history_limit",
            "history_limit must be at least 1",
        ));
    }
    Ok(())
}

fn validate_allocation(config: &TreasuryConfig) -> Result<(), TreasuryError> {
    let a = &config.allocation;
    for (key, value) in [
        ("polymarket_pct", a.polymarket_pct),
        ("base_meme_pct", a.base_meme_pct),
        ("bluechip_pct", a.bluechip_pct),
        ("treasury_reserve_pct", a.treasury_reserve_pct),
        ("savings_staking_pct", a.savings_staking_pct),
        ("emergency_fund_pct", a.emergency_fund_pct),
        ("performance_weight", a.performance_weight),
    ] {
        check_fraction("allocation", key, value)?;
    }
    if (a.base_sum() - 1.0).abs() > SUM_TOLERANCE {
        return Err(invalid(
            "allocation",
            "polymarket_pct",
            &format!("bucket shares must sum to 1, got {:.4}", a.base_sum()),
        ));
    }
    Ok(())
}

fn validate_risk(config: &TreasuryConfig) -> Result<(), TreasuryError> {
    let r = &config.risk;
    check_non_negative("risk", "daily_loss_limit", r.daily_loss_limit)?;
    check_fraction("risk", "drawdown_pause_pct", r.drawdown_pause_pct)?;
    check_non_negative("risk", "max_trade", r.max_trade)?;
    check_non_negative("risk", "blessing_max_trade", r.blessing_max_trade)?;
    if r.blessing_max_trade < r.max_trade {
        return Err(invalid(
            "risk",
            "blessing_max_trade",
            "blessing_max_trade must be at least max_trade",
        ));
    }
    Ok(())
}

fn validate_blessing(config: &TreasuryConfig) -> Result<(), TreasuryError> {
    let b = &config.blessing;
    check_fraction("blessing", "min_confidence", b.min_confidence)?;
    check_non_negative("blessing", "min_momentum", b.min_momentum)?;
    check_non_negative("blessing", "min_volume_ratio", b.min_volume_ratio)?;
    check_non_negative("blessing", "max_spread", b.max_spread)?;
    if b.min_signals > 3 {
        return Err(invalid(
            "blessing",
            "min_signals",
            "min_signals must be between 0 and 3",
        ));
    }
    Ok(())
}

fn validate_distribution(config: &TreasuryConfig) -> Result<(), TreasuryError> {
    let d = &config.distribution;
    for (key, value) in [
        ("reinvest_pct", d.reinvest_pct),
        ("treasury_pct", d.treasury_pct),
        ("savings_pct", d.savings_pct),
        ("bluechip_pct", d.bluechip_pct),
    ] {
        check_fraction("distribution", key, value)?;
    }
    if (d.split_sum() - 1.0).abs() > SUM_TOLERANCE {
        return Err(invalid(
            "distribution",
            "reinvest_pct",
            &format!("win split must sum to 1, got {:.4}", d.split_sum()),
        ));
    }
    Ok(())
}

fn validate_harvest(config: &TreasuryConfig) -> Result<(), TreasuryError> {
    check_fraction("harvest", "min_reserve_pct", config.harvest.min_reserve_pct)?;
    check_non_negative("harvest", "min_harvest", config.harvest.min_harvest)?;
    Ok(())
}

fn validate_paper(config: &TreasuryConfig) -> Result<(), TreasuryError> {
    if config.paper.cycle_interval_secs == 0 {
        return Err(invalid(
            "paper",
            "cycle_interval_secs",
            "cycle_interval_secs must be at least 1",
        ));
    }
    if config.paper.members.is_empty() {
        return Err(TreasuryError::ConfigMissing {
            section: "paper".to_string(),
            key: "members".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of(err: TreasuryError) -> String {
        match err {
            TreasuryError::ConfigInvalid { key, .. } | TreasuryError::ConfigMissing { key, .. } => key,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn defaults_pass() {
        assert!(validate_treasury_config(&TreasuryConfig::default()).is_ok());
    }

    #[test]
    fn initial_capital_zero_fails() {
        let mut c = TreasuryConfig::default();
        c.initial_capital = 0.0;
        assert_eq!(key_of(validate_treasury_config(&c).unwrap_err()), "initial_capital");
    }

    #[test]
    fn history_limit_zero_fails() {
        let mut c = TreasuryConfig::default();
        c.history_limit = 0;
        assert_eq!(key_of(validate_treasury_config(&c).unwrap_err()), "history_limit");
    }

    #[test]
    fn allocation_must_sum_to_one() {
        let mut c = TreasuryConfig::default();
        c.allocation.emergency_fund_pct = 0.10;
        let err = validate_treasury_config(&c).unwrap_err();
        assert!(err.to_string().contains("sum to 1"));
    }

    #[test]
    fn allocation_share_out_of_range_fails() {
        let mut c = TreasuryConfig::default();
        c.allocation.savings_staking_pct = -0.1;
        assert_eq!(key_of(validate_treasury_config(&c).unwrap_err()), "savings_staking_pct");
    }

    #[test]
    fn negative_daily_loss_limit_fails() {
        let mut c = TreasuryConfig::default();
        c.risk.daily_loss_limit = -1.0;
        assert_eq!(key_of(validate_treasury_config(&c).unwrap_err()), "daily_loss_limit");
    }

    #[test]
    fn blessing_cap_below_normal_cap_fails() {
        let mut c = TreasuryConfig::default();
        c.risk.blessing_max_trade = 10.0;
        assert_eq!(key_of(validate_treasury_config(&c).unwrap_err()), "blessing_max_trade");
    }

    #[test]
    fn min_signals_above_three_fails() {
        let mut c = TreasuryConfig::default();
        c.blessing.min_signals = 4;
        assert_eq!(key_of(validate_treasury_config(&c).unwrap_err()), "min_signals");
    }

    #[test]
    fn distribution_must_sum_to_one() {
        let mut c = TreasuryConfig::default();
        c.distribution.reinvest_pct = 0.5;
        assert_eq!(key_of(validate_treasury_config(&c).unwrap_err()), "reinvest_pct");
    }

    #[test]
    fn harvest_reserve_pct_out_of_range_fails() {
        let mut c = TreasuryConfig::default();
        c.harvest.min_reserve_pct = 1.2;
        assert_eq!(key_of(validate_treasury_config(&c).unwrap_err()), "min_reserve_pct");
    }

    #[test]
    fn empty_members_fail() {
        let mut c = TreasuryConfig::default();
        c.paper.members.clear();
        assert_eq!(key_of(validate_treasury_config(&c).unwrap_err()), "members");
    }

    #[test]
    fn zero_interval_fails() {
        let mut c = TreasuryConfig::default();
        c.paper.cycle_interval_secs = 0;
        assert_eq!(key_of(validate_treasury_config(&c).unwrap_err()), "cycle_interval_secs");
    }
}
