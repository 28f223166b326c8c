//! Main application configuration

use serde::{Deserialize, Serialize};

pub use super::logging::LoggingConfig;
pub use super::optimization::OptimizationConfig;
pub use super::prediction::PredictionConfig;
pub use super::routing::RoutingConfig;
pub use super::scoring::{ScoreWeights, ScoringConfig};
pub use super::subscription::SubscriptionConfig;

/// Root configuration, one section per component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub routing: RoutingConfig,
    pub scoring: ScoringConfig,
    pub optimization: OptimizationConfig,
    pub prediction: PredictionConfig,
    pub subscription: SubscriptionConfig,
}
