use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Operator-selectable optimisation target. Wire strings are case-sensitive
/// and exactly the identifiers in the glossary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationTarget {
    MaxProfit,
    MaxGrowthPct,
    FastestSpeed,
    MaxWinRate,
    MinDrawdown,
    BestSharpe,
    SentimentAligned,
    Custom,
}

/// Non-normalised scoring weights. Only `Custom` targets take operator-
/// supplied weights directly; the other targets seed these from the preset
/// table in `presets::for_target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub profit: f64,
    pub win_rate: f64,
    pub efficiency: f64,
    pub resource_penalty: f64,
    pub speed: f64,
    pub sentiment: f64,
    pub drawdown: f64,
}

impl Weights {
    pub fn zeroed() -> Self {
        Self {
            profit: 0.0,
            win_rate: 0.0,
            efficiency: 0.0,
            resource_penalty: 0.0,
            speed: 0.0,
            sentiment: 0.0,
            drawdown: 0.0,
        }
    }

    fn validate(&self) -> Result<(), EngineError> {
        let fields = [
            ("profit", self.profit),
            ("win_rate", self.win_rate),
            ("efficiency", self.efficiency),
            ("resource_penalty", self.resource_penalty),
            ("speed", self.speed),
            ("sentiment", self.sentiment),
            ("drawdown", self.drawdown),
        ];
        for (name, v) in fields {
            if v < 0.0 || !v.is_finite() {
                return Err(EngineError::ConfigInvalid {
                    reason: format!("weight '{name}' must be a non-negative finite number, got {v}"),
                });
            }
        }
        Ok(())
    }
}

/// Preset weight tables, keyed by optimisation target. `Custom` has no
/// preset; the operator's own weights are used unmodified.
pub mod presets {
    use super::{OptimizationTarget, Weights};

    pub fn for_target(target: OptimizationTarget) -> Option<Weights> {
        use OptimizationTarget::*;
        let w = match target {
            MaxProfit => Weights {
                profit: 0.50,
                win_rate: 0.25,
                efficiency: 0.15,
                resource_penalty: 0.10,
                speed: 0.0,
                sentiment: 0.0,
                drawdown: 0.0,
            },
            MaxGrowthPct => Weights {
                profit: 0.60,
                win_rate: 0.20,
                efficiency: 0.10,
                resource_penalty: 0.10,
                speed: 0.0,
                sentiment: 0.0,
                drawdown: 0.0,
            },
            FastestSpeed => Weights {
                profit: 0.25,
                win_rate: 0.20,
                efficiency: 0.15,
                resource_penalty: 0.10,
                speed: 0.30,
                sentiment: 0.0,
                drawdown: 0.0,
            },
            MaxWinRate => Weights {
                profit: 0.20,
                win_rate: 0.50,
                efficiency: 0.20,
                resource_penalty: 0.10,
                speed: 0.0,
                sentiment: 0.0,
                drawdown: 0.0,
            },
            MinDrawdown => Weights {
                profit: 0.30,
                win_rate: 0.20,
                efficiency: 0.10,
                resource_penalty: 0.10,
                speed: 0.0,
                sentiment: 0.0,
                drawdown: 0.30,
            },
            BestSharpe => Weights {
                profit: 0.30,
                win_rate: 0.20,
                efficiency: 0.30,
                resource_penalty: 0.10,
                speed: 0.0,
                sentiment: 0.0,
                drawdown: 0.10,
            },
            SentimentAligned => Weights {
                profit: 0.25,
                win_rate: 0.20,
                efficiency: 0.10,
                resource_penalty: 0.10,
                speed: 0.0,
                sentiment: 0.35,
                drawdown: 0.0,
            },
            Custom => return None,
        };
        Some(w)
    }
}

/// Pruning schedule and gating thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PruningPolicy {
    pub first_pruning_days: u32,
    pub deep_pruning_days: u32,
    pub optimal_state_days: u32,
    pub first_keep_frac: f64,
    pub deep_keep_frac: f64,
    pub optimal_keep_count: u32,
    pub min_trades_for_eval: u64,
    pub min_days_for_eval: u32,
}

impl Default for PruningPolicy {
    fn default() -> Self {
        Self {
            first_pruning_days: 30,
            deep_pruning_days: 60,
            optimal_state_days: 90,
            first_keep_frac: 0.50,
            deep_keep_frac: 0.25,
            optimal_keep_count: 3,
            min_trades_for_eval: 10,
            min_days_for_eval: 7,
        }
    }
}

impl PruningPolicy {
    fn validate(&self) -> Result<(), EngineError> {
        if !(self.first_pruning_days < self.deep_pruning_days
            && self.deep_pruning_days < self.optimal_state_days)
        {
            return Err(EngineError::ConfigInvalid {
                reason: format!(
                    "pruning day thresholds must be strictly increasing, got {}/{}/{}",
                    self.first_pruning_days, self.deep_pruning_days, self.optimal_state_days
                ),
            });
        }
        if !(self.first_keep_frac > 0.0 && self.first_keep_frac <= 1.0) {
            return Err(EngineError::ConfigInvalid {
                reason: format!("first_keep_frac must be in (0,1], got {}", self.first_keep_frac),
            });
        }
        if !(self.deep_keep_frac > 0.0 && self.deep_keep_frac <= 1.0) {
            return Err(EngineError::ConfigInvalid {
                reason: format!("deep_keep_frac must be in (0,1], got {}", self.deep_keep_frac),
            });
        }
        if self.optimal_keep_count < 1 {
            return Err(EngineError::ConfigInvalid {
                reason: "optimal_keep_count must be >= 1".into(),
            });
        }
        Ok(())
    }
}

/// Top-level engine configuration. `target` seeds `weights` via the preset
/// table at construction time (`for_target`); after that the engine only
/// ever consults `weights`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub enabled: bool,
    pub target: OptimizationTarget,
    pub weights: Weights,
    pub pruning: PruningPolicy,
    #[serde(with = "duration_secs")]
    pub evaluation_interval: Duration,
    pub auto_prune: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::for_target(OptimizationTarget::MaxProfit)
    }
}

impl EngineConfig {
    /// Build a config seeded with the preset weights for `target`. For
    /// `Custom`, weights start zeroed and must be set by the caller.
    pub fn for_target(target: OptimizationTarget) -> Self {
        let weights = presets::for_target(target).unwrap_or_else(Weights::zeroed);
        Self {
            enabled: false,
            target,
            weights,
            pruning: PruningPolicy::default(),
            evaluation_interval: Duration::from_secs(24 * 3600),
            auto_prune: true,
        }
    }

    /// Validates the configuration document rules from §6. Returns the
    /// first violation found; the caller's prior config is left untouched.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.weights.validate()?;
        self.pruning.validate()?;
        if self.evaluation_interval < Duration::from_secs(1) {
            return Err(EngineError::ConfigInvalid {
                reason: "evaluation_interval must be >= 1 second".into(),
            });
        }
        Ok(())
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_target_seeds_preset_weights_exactly() {
        let cfg = EngineConfig::for_target(OptimizationTarget::MaxWinRate);
        assert_eq!(cfg.weights.win_rate, 0.50);
        assert_eq!(cfg.weights.profit, 0.20);
        assert_eq!(cfg.weights.efficiency, 0.20);
        assert_eq!(cfg.weights.resource_penalty, 0.10);
    }

    #[test]
    fn custom_target_has_zeroed_weights() {
        let cfg = EngineConfig::for_target(OptimizationTarget::Custom);
        assert_eq!(cfg.weights, Weights::zeroed());
    }

    #[test]
    fn rejects_non_increasing_day_thresholds() {
        let mut cfg = EngineConfig::default();
        cfg.pruning.deep_pruning_days = cfg.pruning.first_pruning_days;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_negative_weight() {
        let mut cfg = EngineConfig::default();
        cfg.weights.profit = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_short_interval() {
        let mut cfg = EngineConfig::default();
        cfg.evaluation_interval = Duration::from_millis(500);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_keep_frac_out_of_range() {
        let mut cfg = EngineConfig::default();
        cfg.pruning.first_keep_frac = 0.0;
        assert!(cfg.validate().is_err());

        cfg.pruning.first_keep_frac = 1.5;
        assert!(cfg.validate().is_err());
    }
}
