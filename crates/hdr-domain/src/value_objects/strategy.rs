//! Load balancing strategies and subscription plans

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy used to pick a provider among eligible candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancingStrategy {
    /// Adaptive ranking from the optimization engine
    #[default]
    Auto,
    RoundRobin,
    WeightedRoundRobin,
    LeastConnections,
    Geographic,
    CostBased,
    Performance,
}

impl LoadBalancingStrategy {
    pub const ALL: [Self; 7] = [
        Self::Auto,
        Self::RoundRobin,
        Self::WeightedRoundRobin,
        Self::LeastConnections,
        Self::Geographic,
        Self::CostBased,
        Self::Performance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::RoundRobin => "round_robin",
            Self::WeightedRoundRobin => "weighted_round_robin",
            Self::LeastConnections => "least_connections",
            Self::Geographic => "geographic",
            Self::CostBased => "cost_based",
            Self::Performance => "performance",
        }
    }
}

impl fmt::Display for LoadBalancingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription tier of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    #[default]
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl PlanType {
    /// Monthly request allowance; `None` means unlimited
    pub fn request_limit(&self) -> Option<u64> {
        match self {
            Self::Free => Some(1_000),
            Self::Basic => Some(10_000),
            Self::Pro => Some(100_000),
            Self::Enterprise => None,
        }
    }

    /// Plans that only prefer zero-cost providers when cost-based routing
    pub fn is_cost_restricted(&self) -> bool {
        matches!(self, Self::Free | Self::Basic)
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        };
        f.write_str(name)
    }
}
