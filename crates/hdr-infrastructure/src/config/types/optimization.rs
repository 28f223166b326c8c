//! Adaptive optimization engine configuration

use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Sample retention, factor weights and reputation update knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    pub history_retention_days: i64,
    pub recent_window_hours: i64,
    pub load_window_secs: i64,
    pub load_ceiling: u64,
    /// Multiplicative jitter amplitude; `0.0` makes scoring deterministic
    pub jitter: f64,
    pub retrain_min_samples: usize,
    pub outcome_nudge: f64,
    pub latency_nudge: f64,
    pub latency_reference_ms: f64,
    pub recommendation_limit: usize,
    pub max_samples_per_provider: usize,

    pub history_weight: f64,
    pub affinity_weight: f64,
    pub load_weight: f64,
    pub cost_weight: f64,
}

impl OptimizationConfig {
    pub fn factor_weight_sum(&self) -> f64 {
        self.history_weight + self.affinity_weight + self.load_weight + self.cost_weight
    }
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            history_retention_days: HISTORY_RETENTION_DAYS,
            recent_window_hours: RECENT_WINDOW_HOURS,
            load_window_secs: LOAD_WINDOW_SECS,
            load_ceiling: LOAD_CEILING,
            jitter: SCORE_JITTER,
            retrain_min_samples: RETRAIN_MIN_SAMPLES,
            outcome_nudge: OUTCOME_NUDGE,
            latency_nudge: LATENCY_NUDGE,
            latency_reference_ms: LATENCY_REFERENCE_MS,
            recommendation_limit: RECOMMENDATION_LIMIT,
            max_samples_per_provider: MAX_SAMPLES_PER_PROVIDER,
            history_weight: FACTOR_WEIGHT_HISTORY,
            affinity_weight: FACTOR_WEIGHT_AFFINITY,
            load_weight: FACTOR_WEIGHT_LOAD,
            cost_weight: FACTOR_WEIGHT_COST,
        }
    }
}
