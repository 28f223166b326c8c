//! Routing configuration types

use crate::constants::DEFAULT_PROVIDER_CALL_TIMEOUT_SECS;
use hdr_domain::value_objects::{LoadBalancingStrategy, ProviderType};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Router and registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Time budget of a single provider attempt
    pub provider_call_timeout_secs: u64,

    /// Strategy used when the caller does not pick one
    pub default_strategy: LoadBalancingStrategy,

    /// Storage provider new requests default to
    pub current_storage_provider: ProviderType,

    /// Walk the failover list when an attempt fails
    pub auto_failover_enabled: bool,

    /// Fan saves out to the replication list
    pub auto_replication_enabled: bool,

    /// Restrict load balancing to the load-balance list
    pub auto_load_balance_enabled: bool,

    /// Ordered failover candidates
    pub auto_failover_providers: Vec<ProviderType>,

    /// Replication targets
    pub auto_replication_providers: Vec<ProviderType>,

    /// Load balancing pool
    pub auto_load_balance_providers: Vec<ProviderType>,
}

impl RoutingConfig {
    pub fn provider_call_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_call_timeout_secs)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            provider_call_timeout_secs: DEFAULT_PROVIDER_CALL_TIMEOUT_SECS,
            default_strategy: LoadBalancingStrategy::Auto,
            current_storage_provider: ProviderType::MongoDb,
            auto_failover_enabled: true,
            auto_replication_enabled: false,
            auto_load_balance_enabled: true,
            auto_failover_providers: vec![
                ProviderType::MongoDb,
                ProviderType::SqliteDb,
                ProviderType::Ipfs,
                ProviderType::LocalFile,
            ],
            auto_replication_providers: vec![ProviderType::MongoDb, ProviderType::Ipfs],
            auto_load_balance_providers: vec![
                ProviderType::MongoDb,
                ProviderType::SqliteDb,
                ProviderType::Ipfs,
            ],
        }
    }
}
