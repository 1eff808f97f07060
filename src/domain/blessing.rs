//! Blessing detection: high-conviction opportunities that unlock the larger
//! per-trade cap.
//!
//! Confidence is a hard gate. Past it, momentum, volume and spread each vote
//! and a majority (`min_signals`) is enough. This is a heuristic, not a
//! validated model.

use super::config::BlessingRules;
use super::market::{Decision, MarketAnalysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlessingVerdict {
    pub confident: bool,
    pub momentum: bool,
    pub volume: bool,
    pub spread: bool,
}

impl BlessingVerdict {
    pub fn signals(&self) -> usize {
        [self.momentum, self.volume, self.spread]
            .iter()
            .filter(|s| **s)
            .count()
    }

    pub fn is_blessing(&self, rules: &BlessingRules) -> bool {
        self.confident && self.signals() >= rules.min_signals
    }
}

/// Evaluate every signal. Signals are only evaluated when the confidence gate
/// passes; otherwise all report false.
pub fn evaluate(decision: &Decision, analysis: &MarketAnalysis, rules: &BlessingRules) -> BlessingVerdict {
    if decision.confidence < rules.min_confidence {
        return BlessingVerdict {
            confident: false,
            momentum: false,
            volume: false,
            spread: false,
        };
    }
    BlessingVerdict {
        confident: true,
        momentum: analysis
            .momentum
            .is_some_and(|m| m.abs() >= rules.min_momentum),
        volume: analysis
            .volume_ratio
            .is_some_and(|v| v >= rules.min_volume_ratio),
        spread: analysis.spread.is_some_and(|s| s <= rules.max_spread),
    }
}

pub fn is_blessing(decision: &Decision, analysis: &MarketAnalysis, rules: &BlessingRules) -> bool {
    evaluate(decision, analysis, rules).is_blessing(rules)
}
