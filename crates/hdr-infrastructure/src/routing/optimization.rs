//! Adaptive optimization engine
//!
//! Keeps a time-windowed history of per-provider outcomes, a reputation per
//! provider nudged after every call, and ranks candidates for a request by
//! blending recent history, request-kind affinity, recent load and cost
//! efficiency.

use super::performance::PerformanceMonitor;
use crate::config::OptimizationConfig;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hdr_domain::constants::NEUTRAL_REPUTATION;
use hdr_domain::error::{Error, Result};
use hdr_domain::value_objects::{AccessPattern, ProviderType, RequestKind};
use rand::Rng;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// One observed provider call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSample {
    pub provider: ProviderType,
    pub kind: RequestKind,
    pub success: bool,
    pub latency_ms: f64,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
}

impl PerformanceSample {
    /// Sample stamped with the current time
    pub fn new(provider: ProviderType, kind: RequestKind, success: bool, latency_ms: f64) -> Self {
        Self {
            provider,
            kind,
            success,
            latency_ms,
            timestamp: Utc::now(),
            error: None,
        }
    }

    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// A ranked candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderRecommendation {
    pub provider: ProviderType,
    /// Blended score in `[0, 1]`
    pub score: f64,
}

/// Area an optimization recommendation concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Performance,
    Cost,
    Reliability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Operator-facing advice derived from the history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationRecommendation {
    pub provider: ProviderType,
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub message: String,
}

/// Aggregate over a set of samples
#[derive(Debug, Clone, Copy)]
struct SampleStats {
    count: usize,
    success_rate: f64,
    average_latency_ms: f64,
}

impl SampleStats {
    fn of<'a, I: Iterator<Item = &'a PerformanceSample>>(samples: I) -> Option<Self> {
        let (mut count, mut successes, mut latency) = (0usize, 0usize, 0.0);
        for s in samples {
            count += 1;
            successes += usize::from(s.success);
            latency += s.latency_ms;
        }
        (count > 0).then(|| Self {
            count,
            success_rate: successes as f64 / count as f64,
            average_latency_ms: latency / count as f64,
        })
    }
}

/// Reputation tracker and candidate ranker
pub struct OptimizationEngine {
    config: OptimizationConfig,
    monitor: Arc<PerformanceMonitor>,
    history: DashMap<ProviderType, VecDeque<PerformanceSample>>,
    reputation: DashMap<ProviderType, f64>,
}

impl OptimizationEngine {
    pub fn new(config: OptimizationConfig, monitor: Arc<PerformanceMonitor>) -> Self {
        Self {
            config,
            monitor,
            history: DashMap::new(),
            reputation: DashMap::new(),
        }
    }

    pub fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Recording
    // ---------------------------------------------------------------------

    /// Append a call outcome and nudge the provider's reputation
    pub fn record_outcome(
        &self,
        provider: ProviderType,
        kind: RequestKind,
        success: bool,
        latency_ms: f64,
        error: Option<String>,
    ) {
        let mut sample = PerformanceSample::new(provider, kind, success, latency_ms);
        sample.error = error;
        self.record_sample(sample);

        let latency_term = self.latency_term(latency_ms);
        let delta = if success {
            self.config.outcome_nudge
        } else {
            -self.config.outcome_nudge
        } + self.config.latency_nudge * (2.0 * latency_term - 1.0);

        let mut rep = self.reputation.entry(provider).or_insert(NEUTRAL_REPUTATION);
        *rep = clamp_unit(*rep + delta, NEUTRAL_REPUTATION);
        debug!(provider = %provider, success, reputation = *rep, "Reputation updated");
    }

    /// Append a sample to the history, pruning anything past retention
    pub fn record_sample(&self, sample: PerformanceSample) {
        let now = Utc::now();
        let cutoff = now - Duration::days(self.config.history_retention_days);
        {
            let mut samples = self.history.entry(sample.provider).or_default();
            samples.push_back(sample);
            samples.retain(|s| s.timestamp >= cutoff);
            while samples.len() > self.config.max_samples_per_provider {
                samples.pop_front();
            }
        }
        self.prune(now);
    }

    /// Drop samples older than the retention window for every provider
    pub fn prune(&self, now: DateTime<Utc>) {
        let cutoff = now - Duration::days(self.config.history_retention_days);
        for mut samples in self.history.iter_mut() {
            while samples.front().is_some_and(|s| s.timestamp < cutoff) {
                samples.pop_front();
            }
        }
        self.history.retain(|_, samples| !samples.is_empty());
    }

    // ---------------------------------------------------------------------
    // Scoring
    // ---------------------------------------------------------------------

    /// Blended score of a provider for a request kind, in `[0, 1]`
    pub fn score(&self, provider: ProviderType, kind: RequestKind) -> f64 {
        let base = self.blended_score(provider, kind, Utc::now());
        let jitter = self.config.jitter;
        let factor = if jitter > 0.0 {
            1.0 + rand::rng().random_range(-jitter..=jitter)
        } else {
            1.0
        };
        clamp_unit(base * factor, NEUTRAL_REPUTATION)
    }

    /// Top candidates for the request kind, best first.
    ///
    /// Never fails: if any score cannot be computed the candidates are
    /// returned in static identity order instead.
    pub fn recommend(
        &self,
        kind: RequestKind,
        candidates: &[ProviderType],
    ) -> Vec<ProviderRecommendation> {
        match self.try_rank(kind, candidates) {
            Ok(ranked) => ranked,
            Err(e) => {
                warn!(error = %e, "Adaptive ranking failed, using static order");
                self.static_ranking(candidates)
            }
        }
    }

    fn try_rank(
        &self,
        kind: RequestKind,
        candidates: &[ProviderType],
    ) -> Result<Vec<ProviderRecommendation>> {
        let mut ranked = Vec::with_capacity(candidates.len());
        for &provider in dedup(candidates).iter() {
            let score = self.score(provider, kind);
            if !score.is_finite() {
                return Err(Error::internal(format!("non-finite score for {provider}")));
            }
            ranked.push(ProviderRecommendation { provider, score });
        }
        // Stable sort keeps candidate order among equal scores
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked.truncate(self.config.recommendation_limit);
        Ok(ranked)
    }

    fn static_ranking(&self, candidates: &[ProviderType]) -> Vec<ProviderRecommendation> {
        let mut providers = dedup(candidates);
        providers.sort();
        providers
            .into_iter()
            .take(self.config.recommendation_limit)
            .map(|provider| ProviderRecommendation {
                provider,
                score: NEUTRAL_REPUTATION,
            })
            .collect()
    }

    fn blended_score(&self, provider: ProviderType, kind: RequestKind, now: DateTime<Utc>) -> f64 {
        let c = &self.config;
        c.history_weight * self.historical_factor(provider, now)
            + c.affinity_weight * affinity(provider, kind.access())
            + c.load_weight * self.load_factor(provider, now)
            + c.cost_weight * cost_efficiency(provider)
    }

    /// Recent performance in `[0, 1]`, averaged with the reputation.
    ///
    /// The observed term comes from the engine's own samples in the recent
    /// window, else from the monitor's composite score. Without either the
    /// reputation stands alone.
    fn historical_factor(&self, provider: ProviderType, now: DateTime<Utc>) -> f64 {
        let since = now - Duration::hours(self.config.recent_window_hours);
        let recent = self
            .history
            .get(&provider)
            .and_then(|samples| SampleStats::of(samples.iter().filter(|s| s.timestamp >= since)));
        let observed = match recent {
            Some(stats) => Some(f64::midpoint(
                self.latency_term(stats.average_latency_ms),
                stats.success_rate,
            )),
            None => self
                .monitor
                .metrics(provider)
                .filter(|m| m.total_requests > 0)
                .map(|_| self.monitor.overall_score(provider)),
        };
        let reputation = self.reputation(provider);
        observed.map_or(reputation, |o| f64::midpoint(o, reputation))
    }

    /// 1.0 when idle, falling to 0.0 as recent requests approach the ceiling
    fn load_factor(&self, provider: ProviderType, now: DateTime<Utc>) -> f64 {
        let since = now - Duration::seconds(self.config.load_window_secs);
        let count = self.history.get(&provider).map_or(0, |samples| {
            samples.iter().filter(|s| s.timestamp >= since).count()
        });
        let ceiling = self.config.load_ceiling as f64;
        1.0 - (count as f64).min(ceiling) / ceiling
    }

    /// 1.0 for an instant response, 0.0 at or beyond the reference latency
    fn latency_term(&self, latency_ms: f64) -> f64 {
        let reference = self.config.latency_reference_ms;
        1.0 - latency_ms.clamp(0.0, reference) / reference
    }

    // ---------------------------------------------------------------------
    // Model maintenance
    // ---------------------------------------------------------------------

    /// Recompute reputations from the retained history.
    ///
    /// Providers with fewer samples than the configured minimum keep their
    /// incrementally nudged value. Returns the number of providers updated.
    pub fn retrain(&self) -> usize {
        self.prune(Utc::now());
        let mut retrained = 0;
        for samples in &self.history {
            if samples.len() < self.config.retrain_min_samples {
                continue;
            }
            if let Some(stats) = SampleStats::of(samples.iter()) {
                let latency = self.latency_term(stats.average_latency_ms);
                let score = f64::midpoint(stats.success_rate, latency);
                self.reputation
                    .insert(*samples.key(), clamp_unit(score, NEUTRAL_REPUTATION));
                retrained += 1;
            }
        }
        debug!(retrained, "Reputations retrained");
        retrained
    }

    /// Predicted performance in `[0, 1]`, weighting newer samples more.
    ///
    /// Neutral until the provider has the minimum number of samples.
    pub fn predict_performance(&self, provider: ProviderType) -> f64 {
        let Some(samples) = self.history.get(&provider) else {
            return NEUTRAL_REPUTATION;
        };
        if samples.len() < self.config.retrain_min_samples {
            return NEUTRAL_REPUTATION;
        }
        let (mut weighted, mut total_weight) = (0.0, 0.0);
        for (i, s) in samples.iter().enumerate() {
            let weight = (i + 1) as f64;
            let outcome = if s.success { 1.0 } else { 0.0 };
            weighted += weight * (0.6 * outcome + 0.4 * self.latency_term(s.latency_ms));
            total_weight += weight;
        }
        clamp_unit(weighted / total_weight, NEUTRAL_REPUTATION)
    }

    /// Advice derived from each provider's retained history
    pub fn recommendations(&self) -> Vec<OptimizationRecommendation> {
        let mut out = Vec::new();
        let mut providers: Vec<ProviderType> = self.history.iter().map(|e| *e.key()).collect();
        providers.sort();
        for provider in providers {
            let Some(stats) = self
                .history
                .get(&provider)
                .and_then(|samples| SampleStats::of(samples.iter()))
            else {
                continue;
            };
            if stats.average_latency_ms > self.config.latency_reference_ms {
                out.push(OptimizationRecommendation {
                    provider,
                    kind: RecommendationKind::Performance,
                    priority: Priority::High,
                    message: format!(
                        "Average response time {:.0}ms exceeds {:.0}ms; route latency-sensitive reads elsewhere",
                        stats.average_latency_ms, self.config.latency_reference_ms
                    ),
                });
            }
            if stats.success_rate < crate::constants::RELIABILITY_ALERT_SUCCESS_RATE {
                out.push(OptimizationRecommendation {
                    provider,
                    kind: RecommendationKind::Reliability,
                    priority: Priority::High,
                    message: format!(
                        "Success rate {:.1}% over {} calls; add it to failover lists only behind healthier providers",
                        stats.success_rate * 100.0,
                        stats.count
                    ),
                });
            }
            if cost_efficiency(provider) < 0.5 {
                out.push(OptimizationRecommendation {
                    provider,
                    kind: RecommendationKind::Cost,
                    priority: Priority::Medium,
                    message: "High per-operation cost; prefer it only for writes that need its guarantees"
                        .to_string(),
                });
            }
        }
        out
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn reputation(&self, provider: ProviderType) -> f64 {
        self.reputation
            .get(&provider)
            .map_or(NEUTRAL_REPUTATION, |r| *r)
    }

    pub fn sample_count(&self, provider: ProviderType) -> usize {
        self.history.get(&provider).map_or(0, |s| s.len())
    }

    /// Retained samples of a provider, oldest first
    pub fn samples(&self, provider: ProviderType) -> Vec<PerformanceSample> {
        self.history
            .get(&provider)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Static affinity of a provider for an access pattern
pub fn affinity(provider: ProviderType, access: AccessPattern) -> f64 {
    use ProviderType as P;
    match (provider, access) {
        (P::MongoDb | P::AzureCosmosDb, AccessPattern::Read | AccessPattern::Search) => 0.9,
        (P::Neo4j, AccessPattern::Search) => 0.95,
        (P::Neo4j | P::SqliteDb | P::LocalFile, AccessPattern::Read) => 0.85,
        (P::SqliteDb | P::LocalFile, AccessPattern::Search) => 0.7,
        (P::MongoDb | P::AzureCosmosDb | P::SqliteDb | P::Neo4j, AccessPattern::Write) => 0.85,
        (P::LocalFile, AccessPattern::Write) => 0.7,
        (P::Ipfs | P::Pinata | P::Holo | P::Solid | P::ThreeFold, AccessPattern::Read) => 0.7,
        (P::Ipfs | P::Pinata | P::Holo | P::Solid | P::ThreeFold, AccessPattern::Write) => 0.75,
        (
            P::Scuttlebutt | P::BlockStack | P::Plan | P::Seeds,
            AccessPattern::Read | AccessPattern::Write,
        ) => 0.6,
        (
            P::Ethereum
            | P::Tron
            | P::ChainLink
            | P::Solana
            | P::Polygon
            | P::Arbitrum
            | P::Eosio
            | P::Telos,
            AccessPattern::Write,
        ) => 0.8,
        (
            P::Ethereum
            | P::Tron
            | P::ChainLink
            | P::Solana
            | P::Polygon
            | P::Arbitrum
            | P::Eosio
            | P::Telos,
            AccessPattern::Read,
        ) => 0.5,
        (_, AccessPattern::Search) => 0.3,
        (P::Default, _) => NEUTRAL_REPUTATION,
    }
}

/// Static cost efficiency of a provider, 1.0 for free providers
pub fn cost_efficiency(provider: ProviderType) -> f64 {
    use ProviderType as P;
    match provider {
        P::MongoDb
        | P::Ipfs
        | P::Seeds
        | P::Scuttlebutt
        | P::ThreeFold
        | P::Holo
        | P::Plan
        | P::Solid
        | P::BlockStack => 1.0,
        P::SqliteDb | P::LocalFile | P::Neo4j => 0.9,
        P::Pinata => 0.7,
        P::AzureCosmosDb | P::Solana | P::Polygon | P::Arbitrum | P::Telos | P::Eosio => 0.6,
        P::Tron => 0.4,
        P::ChainLink => 0.3,
        P::Ethereum => 0.2,
        P::Default => NEUTRAL_REPUTATION,
    }
}

fn dedup(candidates: &[ProviderType]) -> Vec<ProviderType> {
    let mut out: Vec<ProviderType> = Vec::with_capacity(candidates.len());
    for p in candidates {
        if !out.contains(p) {
            out.push(*p);
        }
    }
    out
}

fn clamp_unit(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}
