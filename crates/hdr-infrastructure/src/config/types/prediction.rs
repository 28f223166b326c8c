//! Predictive failover configuration

use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Failure-probability weights, saturation points and model bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub response_time_ceiling_ms: f64,
    pub network_latency_ceiling_ms: f64,
    pub cost_ceiling: f64,

    pub response_time_weight: f64,
    pub error_rate_weight: f64,
    pub uptime_weight: f64,
    pub geography_weight: f64,
    pub cost_weight: f64,

    /// Term value when geography or cost data is missing
    pub missing_data_term: f64,
    pub failure_log_capacity: usize,
    pub risk_factor_increment: f64,
    pub confidence_min_events: usize,
}

impl PredictionConfig {
    pub fn weight_sum(&self) -> f64 {
        self.response_time_weight
            + self.error_rate_weight
            + self.uptime_weight
            + self.geography_weight
            + self.cost_weight
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            response_time_ceiling_ms: RESPONSE_TIME_CEILING_MS,
            network_latency_ceiling_ms: NETWORK_LATENCY_CEILING_MS,
            cost_ceiling: COST_CEILING,
            response_time_weight: RISK_WEIGHT_RESPONSE_TIME,
            error_rate_weight: RISK_WEIGHT_ERROR_RATE,
            uptime_weight: RISK_WEIGHT_UPTIME,
            geography_weight: RISK_WEIGHT_GEOGRAPHY,
            cost_weight: RISK_WEIGHT_COST,
            missing_data_term: RISK_MISSING_DATA_TERM,
            failure_log_capacity: FAILURE_LOG_CAPACITY,
            risk_factor_increment: RISK_FACTOR_INCREMENT,
            confidence_min_events: CONFIDENCE_MIN_EVENTS,
        }
    }
}
