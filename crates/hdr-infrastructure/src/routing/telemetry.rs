//! Routing metrics
//!
//! Thin wrappers over the `metrics` facade. Nothing is exported unless the
//! host process installs a recorder.

use hdr_domain::value_objects::{
    LoadBalancingStrategy, OperationClass, ProviderType, RequestKind,
};
use metrics::{counter, gauge, histogram};
use tracing::debug;

/// Record that a provider was selected for a request
pub fn record_selection(provider: ProviderType, strategy: LoadBalancingStrategy) {
    counter!(
        "hdr_routing_selections_total",
        "provider" => provider.as_str(),
        "strategy" => strategy.as_str()
    )
    .increment(1);
    debug!(provider = %provider, strategy = %strategy, "Provider selected");
}

/// Record the outcome and duration of one provider attempt
pub fn record_attempt(provider: ProviderType, kind: RequestKind, success: bool, duration_ms: f64) {
    let outcome = if success { "success" } else { "failure" };
    counter!(
        "hdr_routing_attempts_total",
        "provider" => provider.as_str(),
        "operation" => kind.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("hdr_routing_attempt_duration_ms", "provider" => provider.as_str())
        .record(duration_ms);
}

/// Record entry into a failover loop
pub fn record_failover(from: ProviderType) {
    counter!("hdr_routing_failovers_total", "from" => from.as_str()).increment(1);
}

/// Record a request rejected by its subscription limits
pub fn record_quota_rejection(class: OperationClass) {
    counter!("hdr_quota_rejections_total", "class" => class.as_str()).increment(1);
}

/// Record a preventive switch away from an at-risk provider
pub fn record_preventive_failover(provider: ProviderType) {
    counter!("hdr_preventive_failovers_total", "provider" => provider.as_str()).increment(1);
}

pub fn update_active_connections(provider: ProviderType, count: u64) {
    gauge!("hdr_provider_active_connections", "provider" => provider.as_str()).set(count as f64);
}
