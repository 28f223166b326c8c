//! Performance monitor scoring configuration

use crate::constants::*;
use hdr_domain::constants::NEUTRAL_SCORE;
use serde::{Deserialize, Serialize};

/// Caller-tunable weights for a strategy-specific score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub performance: f64,
    pub cost: f64,
    pub geography: f64,
    pub availability: f64,
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.performance + self.cost + self.geography + self.availability
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            performance: WEIGHTED_SCORE_PERFORMANCE,
            cost: WEIGHTED_SCORE_COST,
            geography: WEIGHTED_SCORE_GEOGRAPHY,
            availability: WEIGHTED_SCORE_AVAILABILITY,
        }
    }
}

/// Constants of the composite provider score, on the 0-100 scale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Composite weight of the performance sub-score
    pub performance_weight: f64,
    /// Composite weight of the cost sub-score
    pub cost_weight: f64,
    /// Composite weight of the availability sub-score
    pub availability_weight: f64,

    /// Performance sub-score weight of the latency term
    pub latency_weight: f64,
    /// Performance sub-score weight of the throughput term
    pub throughput_weight: f64,
    /// Performance sub-score weight of the error-rate term
    pub error_weight: f64,

    pub latency_ms_per_point: f64,
    pub throughput_points_per_rps: f64,
    pub cost_points_per_unit: f64,

    pub geo_latency_weight: f64,
    pub geo_hops_weight: f64,
    pub geo_points_per_latency_ms: f64,
    pub geo_points_per_hop: f64,

    /// Score given to providers without observations
    pub neutral_score: f64,

    /// Window of the throughput computation
    pub throughput_window_secs: u64,

    /// Retention of the switch log
    pub switch_log_retention_hours: i64,

    /// Default weights of `calculate_weighted_score`
    pub weighted: ScoreWeights,
}

impl ScoringConfig {
    pub fn composite_weight_sum(&self) -> f64 {
        self.performance_weight + self.cost_weight + self.availability_weight
    }

    pub fn performance_weight_sum(&self) -> f64 {
        self.latency_weight + self.throughput_weight + self.error_weight
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            performance_weight: SCORE_WEIGHT_PERFORMANCE,
            cost_weight: SCORE_WEIGHT_COST,
            availability_weight: SCORE_WEIGHT_AVAILABILITY,
            latency_weight: PERF_WEIGHT_LATENCY,
            throughput_weight: PERF_WEIGHT_THROUGHPUT,
            error_weight: PERF_WEIGHT_ERRORS,
            latency_ms_per_point: LATENCY_MS_PER_POINT,
            throughput_points_per_rps: THROUGHPUT_POINTS_PER_RPS,
            cost_points_per_unit: COST_POINTS_PER_UNIT,
            geo_latency_weight: GEO_WEIGHT_LATENCY,
            geo_hops_weight: GEO_WEIGHT_HOPS,
            geo_points_per_latency_ms: GEO_POINTS_PER_LATENCY_MS,
            geo_points_per_hop: GEO_POINTS_PER_HOP,
            neutral_score: NEUTRAL_SCORE,
            throughput_window_secs: THROUGHPUT_WINDOW_SECS,
            switch_log_retention_hours: SWITCH_LOG_RETENTION_HOURS,
            weighted: ScoreWeights::default(),
        }
    }
}
