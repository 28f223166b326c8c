//! Performance monitor
//!
//! Per-provider rolling metrics and the composite provider score. Sub-scores
//! are computed on a 0-100 scale; `overall_score` is normalized to `[0, 1]`.
//! Each provider's metrics sit behind their own map entry lock, so
//! concurrent recordings for one provider serialize while different
//! providers proceed in parallel.

use crate::config::{ScoreWeights, ScoringConfig};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hdr_domain::value_objects::{LoadBalancingStrategy, ProviderType};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Rolling metrics of one provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderPerformanceMetrics {
    pub provider: ProviderType,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Cumulative moving average over successful requests
    pub average_response_time_ms: f64,
    pub peak_response_time_ms: f64,
    pub min_response_time_ms: f64,
    /// Requests per second over the throughput window
    pub throughput_rps: f64,
    pub error_rate: f64,
    pub uptime_percentage: f64,
    pub active_connections: u64,
    pub cost_per_operation: f64,
    /// 0-100
    pub performance_score: f64,
    /// 0-100
    pub cost_score: f64,
    /// 0-100
    pub availability_score: f64,
    /// Composite in `[0, 1]`
    pub overall_score: f64,
    pub last_updated: DateTime<Utc>,
    #[serde(skip)]
    request_times: VecDeque<DateTime<Utc>>,
}

impl ProviderPerformanceMetrics {
    fn new(provider: ProviderType) -> Self {
        Self {
            provider,
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            average_response_time_ms: 0.0,
            peak_response_time_ms: 0.0,
            min_response_time_ms: 0.0,
            throughput_rps: 0.0,
            error_rate: 0.0,
            uptime_percentage: 100.0,
            active_connections: 0,
            cost_per_operation: 0.0,
            performance_score: 0.0,
            cost_score: 0.0,
            availability_score: 0.0,
            overall_score: 0.0,
            last_updated: Utc::now(),
            request_times: VecDeque::new(),
        }
    }
}

/// Location and network distance of a provider
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeographicInfo {
    pub region: String,
    pub country: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub network_latency_ms: f64,
    pub hop_count: u32,
}

/// Operating cost breakdown of a provider
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub storage_cost: f64,
    pub compute_cost: f64,
    pub network_cost: f64,
    pub transaction_cost: f64,
    pub total_cost: f64,
    pub currency: String,
    pub cost_per_gb: f64,
    pub cost_per_operation: f64,
}

/// A recorded change of serving provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSwitch {
    pub from: ProviderType,
    pub to: ProviderType,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Provider metrics store and scorer
pub struct PerformanceMonitor {
    config: ScoringConfig,
    metrics: DashMap<ProviderType, ProviderPerformanceMetrics>,
    geography: DashMap<ProviderType, GeographicInfo>,
    costs: DashMap<ProviderType, CostAnalysis>,
    switches: Mutex<VecDeque<ProviderSwitch>>,
}

impl PerformanceMonitor {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            metrics: DashMap::new(),
            geography: DashMap::new(),
            costs: DashMap::new(),
            switches: Mutex::new(VecDeque::new()),
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Recording
    // ---------------------------------------------------------------------

    /// Record the outcome of one request
    pub fn record_request(
        &self,
        provider: ProviderType,
        success: bool,
        latency_ms: f64,
        cost: f64,
    ) {
        let now = Utc::now();
        let latency_ms = if latency_ms.is_finite() { latency_ms.max(0.0) } else { 0.0 };
        let mut entry = self
            .metrics
            .entry(provider)
            .or_insert_with(|| ProviderPerformanceMetrics::new(provider));
        let m = entry.value_mut();

        m.total_requests += 1;
        if success {
            m.successful_requests += 1;
            let n = m.successful_requests as f64;
            m.average_response_time_ms = (m.average_response_time_ms * (n - 1.0) + latency_ms) / n;
            if m.successful_requests == 1 {
                m.peak_response_time_ms = latency_ms;
                m.min_response_time_ms = latency_ms;
            } else {
                m.peak_response_time_ms = m.peak_response_time_ms.max(latency_ms);
                m.min_response_time_ms = m.min_response_time_ms.min(latency_ms);
            }
        } else {
            m.failed_requests += 1;
        }

        let window_secs = i64::try_from(self.config.throughput_window_secs).unwrap_or(i64::MAX);
        let window = Duration::seconds(window_secs);
        m.request_times.push_back(now);
        while m.request_times.front().is_some_and(|t| now - *t > window) {
            m.request_times.pop_front();
        }
        m.throughput_rps = m.request_times.len() as f64 / self.config.throughput_window_secs as f64;

        let total = m.total_requests as f64;
        m.error_rate = m.failed_requests as f64 / total;
        m.uptime_percentage = m.successful_requests as f64 / total * 100.0;
        if cost.is_finite() {
            m.cost_per_operation = cost.max(0.0);
        }
        m.last_updated = now;
        self.rescore(m);
    }

    /// Track an opening (`true`) or closing (`false`) connection
    pub fn record_connection(&self, provider: ProviderType, connecting: bool) -> u64 {
        let mut entry = self
            .metrics
            .entry(provider)
            .or_insert_with(|| ProviderPerformanceMetrics::new(provider));
        let m = entry.value_mut();
        m.active_connections = if connecting {
            m.active_connections.saturating_add(1)
        } else {
            m.active_connections.saturating_sub(1)
        };
        m.active_connections
    }

    pub fn update_geographic_info(&self, provider: ProviderType, info: GeographicInfo) {
        self.geography.insert(provider, info);
    }

    pub fn update_cost_analysis(&self, provider: ProviderType, analysis: CostAnalysis) {
        if let Some(mut m) = self.metrics.get_mut(&provider) {
            m.cost_per_operation = analysis.cost_per_operation.max(0.0);
            self.rescore(m.value_mut());
        }
        self.costs.insert(provider, analysis);
    }

    /// Log a change of serving provider; entries older than the retention window are dropped
    pub fn record_provider_switch<S: Into<String>>(
        &self,
        from: ProviderType,
        to: ProviderType,
        reason: S,
    ) {
        let now = Utc::now();
        let retention = Duration::hours(self.config.switch_log_retention_hours);
        let switch = ProviderSwitch {
            from,
            to,
            reason: reason.into(),
            at: now,
        };
        debug!(from = %from, to = %to, reason = %switch.reason, "Provider switch recorded");
        let mut log = self.switches.lock().unwrap_or_else(PoisonError::into_inner);
        log.push_back(switch);
        log.retain(|s| now - s.at <= retention);
    }

    pub fn reset_metrics(&self, provider: ProviderType) {
        self.metrics.remove(&provider);
    }

    pub fn reset_all_metrics(&self) {
        self.metrics.clear();
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn metrics(&self, provider: ProviderType) -> Option<ProviderPerformanceMetrics> {
        self.metrics.get(&provider).map(|m| m.clone())
    }

    /// Snapshot of every tracked provider, ordered by provider
    pub fn all_metrics(&self) -> Vec<ProviderPerformanceMetrics> {
        let mut all: Vec<_> = self.metrics.iter().map(|m| m.clone()).collect();
        all.sort_by_key(|m| m.provider);
        all
    }

    pub fn tracked_providers(&self) -> Vec<ProviderType> {
        let mut providers: Vec<_> = self.metrics.iter().map(|m| *m.key()).collect();
        providers.sort();
        providers
    }

    pub fn geographic_info(&self, provider: ProviderType) -> Option<GeographicInfo> {
        self.geography.get(&provider).map(|g| g.clone())
    }

    pub fn cost_analysis(&self, provider: ProviderType) -> Option<CostAnalysis> {
        self.costs.get(&provider).map(|c| c.clone())
    }

    /// Cost charged per operation, from the cost analysis when one exists
    pub fn cost_per_operation(&self, provider: ProviderType) -> f64 {
        self.costs
            .get(&provider)
            .map(|c| c.cost_per_operation)
            .or_else(|| self.metrics.get(&provider).map(|m| m.cost_per_operation))
            .unwrap_or(0.0)
    }

    pub fn active_connections(&self, provider: ProviderType) -> u64 {
        self.metrics
            .get(&provider)
            .map_or(0, |m| m.active_connections)
    }

    pub fn recent_switches(&self) -> Vec<ProviderSwitch> {
        let now = Utc::now();
        let retention = Duration::hours(self.config.switch_log_retention_hours);
        self.switches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| now - s.at <= retention)
            .cloned()
            .collect()
    }

    // ---------------------------------------------------------------------
    // Scoring
    // ---------------------------------------------------------------------

    /// Composite score in `[0, 1]`; neutral for providers never observed
    pub fn overall_score(&self, provider: ProviderType) -> f64 {
        self.observed(provider)
            .map_or(self.config.neutral_score / 100.0, |m| m.overall_score)
    }

    /// Geography score on the 0-100 scale; neutral without geography data
    pub fn geography_score(&self, provider: ProviderType) -> f64 {
        self.geography.get(&provider).map_or(self.config.neutral_score, |g| {
            let latency_penalty = g.network_latency_ms * self.config.geo_points_per_latency_ms;
            let latency = (100.0 - latency_penalty).max(0.0);
            let hops = (100.0 - f64::from(g.hop_count) * self.config.geo_points_per_hop).max(0.0);
            sanitize(
                self.config.geo_latency_weight * latency + self.config.geo_hops_weight * hops,
                self.config.neutral_score,
            )
        })
    }

    /// Blend of performance, cost, geography and availability in `[0, 1]`
    pub fn calculate_weighted_score(
        &self,
        provider: ProviderType,
        weights: Option<ScoreWeights>,
    ) -> f64 {
        let w = weights.unwrap_or(self.config.weighted);
        let neutral = self.config.neutral_score;
        let geography = self.geography_score(provider);
        let (performance, cost, availability) = self
            .observed(provider)
            .map_or((neutral, self.cost_only_score(provider), neutral), |m| {
                (m.performance_score, m.cost_score, m.availability_score)
            });
        let blended = w.performance * performance
            + w.cost * cost
            + w.geography * geography
            + w.availability * availability;
        sanitize(blended / 100.0, neutral / 100.0).clamp(0.0, 1.0)
    }

    /// Strategy-specific score on the 0-100 scale
    pub fn strategy_score(&self, provider: ProviderType, strategy: LoadBalancingStrategy) -> f64 {
        let neutral = self.config.neutral_score;
        if strategy == LoadBalancingStrategy::Geographic {
            return self.geography_score(provider);
        }
        if strategy == LoadBalancingStrategy::LeastConnections {
            return self.metrics.get(&provider).map_or(neutral, |m| {
                (100.0 - m.active_connections as f64).max(0.0)
            });
        }
        let Some(m) = self.observed(provider) else {
            return match strategy {
                LoadBalancingStrategy::CostBased => self.cost_only_score(provider),
                _ => neutral,
            };
        };
        let score = match strategy {
            LoadBalancingStrategy::Performance => m.performance_score,
            LoadBalancingStrategy::CostBased => m.cost_score,
            LoadBalancingStrategy::Geographic | LoadBalancingStrategy::LeastConnections => neutral,
            LoadBalancingStrategy::Auto
            | LoadBalancingStrategy::RoundRobin
            | LoadBalancingStrategy::WeightedRoundRobin => m.overall_score * 100.0,
        };
        sanitize(score, neutral)
    }

    /// Highest-scoring candidate under the strategy; ties keep the earlier candidate
    pub fn get_best_provider(
        &self,
        candidates: &[ProviderType],
        strategy: LoadBalancingStrategy,
    ) -> Option<ProviderType> {
        let mut best: Option<(ProviderType, f64)> = None;
        for &provider in candidates {
            let score = self.strategy_score(provider, strategy);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((provider, score));
            }
        }
        best.map(|(provider, _)| provider)
    }

    /// Metrics of a provider that has completed at least one request
    fn observed(
        &self,
        provider: ProviderType,
    ) -> Option<dashmap::mapref::one::Ref<'_, ProviderType, ProviderPerformanceMetrics>> {
        self.metrics
            .get(&provider)
            .filter(|m| m.total_requests > 0)
    }

    fn cost_only_score(&self, provider: ProviderType) -> f64 {
        self.costs.get(&provider).map_or(self.config.neutral_score, |c| {
            self.cost_score(c.cost_per_operation)
        })
    }

    fn cost_score(&self, cost_per_operation: f64) -> f64 {
        (100.0 - cost_per_operation * self.config.cost_points_per_unit).clamp(0.0, 100.0)
    }

    fn rescore(&self, m: &mut ProviderPerformanceMetrics) {
        let c = &self.config;
        let latency = (100.0 - m.average_response_time_ms / c.latency_ms_per_point).max(0.0);
        let throughput = (m.throughput_rps * c.throughput_points_per_rps).min(100.0);
        let errors = (100.0 - m.error_rate * 100.0).max(0.0);

        m.performance_score = sanitize(
            c.latency_weight * latency + c.throughput_weight * throughput + c.error_weight * errors,
            c.neutral_score,
        );
        m.cost_score = self.cost_score(m.cost_per_operation);
        m.availability_score = m.uptime_percentage.clamp(0.0, 100.0);

        let composite = c.performance_weight * m.performance_score
            + c.cost_weight * m.cost_score
            + c.availability_weight * m.availability_score;
        m.overall_score = sanitize(composite / 100.0, c.neutral_score / 100.0).clamp(0.0, 1.0);
    }
}

/// Replace a non-finite score with the fallback
fn sanitize(score: f64, fallback: f64) -> f64 {
    if score.is_finite() { score } else { fallback }
}
