//! Subscription plan configuration

use crate::constants::{
    DEFAULT_MAX_FAILOVERS_PER_MONTH, DEFAULT_MAX_REPLICATIONS_PER_MONTH, DEFAULT_MAX_STORAGE_GB,
};
use hdr_domain::constants::{FREE_PROVIDERS, HIGH_COST_PROVIDERS};
use hdr_domain::value_objects::{OperationClass, PlanType, ProviderType};
use serde::{Deserialize, Serialize};

/// Caller plan, metered limits and provider allow/deny lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    pub plan_type: PlanType,

    /// Bill overage instead of rejecting over-limit requests
    pub pay_as_you_go_enabled: bool,

    pub max_replications_per_month: u64,
    pub max_failovers_per_month: u64,
    pub max_storage_gb: u64,

    /// Only providers a free plan may use
    pub free_providers: Vec<ProviderType>,

    /// Providers a basic plan may not use
    pub high_cost_providers: Vec<ProviderType>,
}

impl SubscriptionConfig {
    /// Limit for an operation class; `None` means unlimited
    pub fn limit_for(&self, class: OperationClass) -> Option<u64> {
        match class {
            OperationClass::Requests => self.plan_type.request_limit(),
            OperationClass::Replications => Some(self.max_replications_per_month),
            OperationClass::Failovers => Some(self.max_failovers_per_month),
            OperationClass::Storage => Some(self.max_storage_gb),
        }
    }

    /// Whether the plan may route to the provider at all
    pub fn allows(&self, provider: ProviderType) -> bool {
        match self.plan_type {
            PlanType::Free => self.free_providers.contains(&provider),
            PlanType::Basic => !self.high_cost_providers.contains(&provider),
            PlanType::Pro | PlanType::Enterprise => true,
        }
    }

    pub fn is_free_provider(&self, provider: ProviderType) -> bool {
        self.free_providers.contains(&provider)
    }

    pub fn is_high_cost_provider(&self, provider: ProviderType) -> bool {
        self.high_cost_providers.contains(&provider)
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            plan_type: PlanType::Free,
            pay_as_you_go_enabled: false,
            max_replications_per_month: DEFAULT_MAX_REPLICATIONS_PER_MONTH,
            max_failovers_per_month: DEFAULT_MAX_FAILOVERS_PER_MONTH,
            max_storage_gb: DEFAULT_MAX_STORAGE_GB,
            free_providers: FREE_PROVIDERS.to_vec(),
            high_cost_providers: HIGH_COST_PROVIDERS.to_vec(),
        }
    }
}
