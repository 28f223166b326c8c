//! Predictive failover engine
//!
//! Estimates a failure probability per provider from the monitor's metrics,
//! keeps a bounded failure log with additive risk-factor weights, and
//! switches away from providers whose risk reaches `High` before they are
//! used again.

use super::optimization::OptimizationEngine;
use super::performance::{PerformanceMonitor, ProviderPerformanceMetrics};
use super::registry::ProviderRegistry;
use super::telemetry;
use crate::config::PredictionConfig;
use crate::constants::{
    CONFIDENCE_FLOOR, LEARNED_RISK_FACTOR_THRESHOLD, RISK_FACTOR_COST_PER_OP,
    RISK_FACTOR_ERROR_RATE, RISK_FACTOR_NETWORK_LATENCY_MS, RISK_FACTOR_RESPONSE_TIME_MS,
    RISK_FACTOR_THROUGHPUT_RPS, RISK_FACTOR_UPTIME_PERCENT, UNKNOWN_FAILURE_PROBABILITY,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hdr_domain::error::{Error, Result};
use hdr_domain::value_objects::{
    FailureEvent, ProviderCategory, ProviderType, RequestKind, RiskLevel,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Point-in-time failure estimate of one provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderFailurePrediction {
    pub provider: ProviderType,
    /// In `[0, 1]`
    pub failure_probability: f64,
    pub risk_level: RiskLevel,
    /// In `[0, 1)`
    pub confidence: f64,
    pub time_to_failure_secs: i64,
    pub predicted_failure_at: DateTime<Utc>,
    pub risk_factors: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl ProviderFailurePrediction {
    pub fn requires_action(&self) -> bool {
        self.risk_level.requires_action()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreventiveActionType {
    SwitchProvider,
    IncreaseMonitoring,
}

/// Outcome of one preventive step taken during a scan
#[derive(Debug, Clone, Serialize)]
pub struct PreventiveAction {
    pub provider: ProviderType,
    pub action: PreventiveActionType,
    pub alternative: Option<ProviderType>,
    pub success: bool,
    pub details: String,
}

/// Result of a full scan
#[derive(Debug, Clone, Serialize)]
pub struct FailoverReport {
    pub generated_at: DateTime<Utc>,
    /// Highest tier across all predictions; `Unknown` when nothing is known
    pub overall_risk: RiskLevel,
    pub predictions: Vec<ProviderFailurePrediction>,
    pub recommended_actions: Vec<String>,
    pub preventive_actions: Vec<PreventiveAction>,
}

impl FailoverReport {
    pub fn at_risk(&self) -> impl Iterator<Item = &ProviderFailurePrediction> {
        self.predictions.iter().filter(|p| p.requires_action())
    }
}

#[derive(Debug, Default)]
struct FailureModel {
    events: VecDeque<FailureEvent>,
    risk_factors: HashMap<String, f64>,
}

/// Failure predictor and preventive switcher
pub struct PredictiveFailoverEngine {
    config: PredictionConfig,
    monitor: Arc<PerformanceMonitor>,
    optimizer: Arc<OptimizationEngine>,
    registry: Arc<ProviderRegistry>,
    models: DashMap<ProviderType, FailureModel>,
}

impl PredictiveFailoverEngine {
    pub fn new(
        config: PredictionConfig,
        monitor: Arc<PerformanceMonitor>,
        optimizer: Arc<OptimizationEngine>,
        registry: Arc<ProviderRegistry>,
    ) -> Self {
        Self {
            config,
            monitor,
            optimizer,
            registry,
            models: DashMap::new(),
        }
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Failure model
    // ---------------------------------------------------------------------

    /// Append a failure to the provider's bounded log and reinforce the
    /// matching risk factor
    pub fn record_failure_event(&self, event: FailureEvent) {
        let key = event.risk_factor_key();
        let provider = event.provider;
        let mut model = self.models.entry(provider).or_default();
        model.events.push_back(event);
        while model.events.len() > self.config.failure_log_capacity {
            model.events.pop_front();
        }
        let weight = model.risk_factors.entry(key.clone()).or_insert(0.0);
        *weight = (*weight + self.config.risk_factor_increment).min(1.0);
        debug!(provider = %provider, factor = %key, weight = *weight, "Failure event recorded");
    }

    /// Logged failures of a provider, oldest first
    pub fn failure_history(&self, provider: ProviderType) -> Vec<FailureEvent> {
        self.models
            .get(&provider)
            .map(|m| m.events.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Current weight of a learned risk factor, `0.0` when never seen
    pub fn risk_factor_weight(&self, provider: ProviderType, key: &str) -> f64 {
        self.models
            .get(&provider)
            .and_then(|m| m.risk_factors.get(key).copied())
            .unwrap_or(0.0)
    }

    // ---------------------------------------------------------------------
    // Prediction
    // ---------------------------------------------------------------------

    /// Failure estimate for one provider. Never fails: a provider without
    /// observations gets an `Unknown` prediction.
    pub fn predict_failure(&self, provider: ProviderType) -> ProviderFailurePrediction {
        let now = Utc::now();
        let Some(metrics) = self
            .monitor
            .metrics(provider)
            .filter(|m| m.total_requests > 0)
        else {
            let ttf = Duration::hours(24);
            return ProviderFailurePrediction {
                provider,
                failure_probability: UNKNOWN_FAILURE_PROBABILITY,
                risk_level: RiskLevel::Unknown,
                confidence: CONFIDENCE_FLOOR,
                time_to_failure_secs: ttf.num_seconds(),
                predicted_failure_at: now + ttf,
                risk_factors: vec!["Insufficient data".to_string()],
                recommended_actions: vec!["Monitor closely".to_string()],
                generated_at: now,
            };
        };

        let probability = self.failure_probability(provider, &metrics);
        let risk_level = RiskLevel::from_probability(probability);
        let ttf = time_to_failure(probability);
        let risk_factors = self.risk_factors(provider, &metrics);
        let recommended_actions = provider_actions(probability, &risk_factors);

        ProviderFailurePrediction {
            provider,
            failure_probability: probability,
            risk_level,
            confidence: self.confidence(provider, now),
            time_to_failure_secs: ttf.num_seconds(),
            predicted_failure_at: now + ttf,
            risk_factors,
            recommended_actions,
            generated_at: now,
        }
    }

    fn failure_probability(
        &self,
        provider: ProviderType,
        metrics: &ProviderPerformanceMetrics,
    ) -> f64 {
        let c = &self.config;
        let response =
            (metrics.average_response_time_ms / c.response_time_ceiling_ms).clamp(0.0, 1.0);
        let errors = metrics.error_rate.clamp(0.0, 1.0);
        let downtime = ((100.0 - metrics.uptime_percentage) / 100.0).clamp(0.0, 1.0);
        let geography = self
            .monitor
            .geographic_info(provider)
            .map_or(c.missing_data_term, |g| {
                (g.network_latency_ms / c.network_latency_ceiling_ms).clamp(0.0, 1.0)
            });
        let cost = self
            .monitor
            .cost_analysis(provider)
            .map_or(c.missing_data_term, |a| {
                (a.cost_per_operation / c.cost_ceiling).clamp(0.0, 1.0)
            });

        let sum = c.response_time_weight * response
            + c.error_rate_weight * errors
            + c.uptime_weight * downtime
            + c.geography_weight * geography
            + c.cost_weight * cost;
        if sum.is_finite() {
            sum.clamp(0.0, 1.0)
        } else {
            UNKNOWN_FAILURE_PROBABILITY
        }
    }

    fn confidence(&self, provider: ProviderType, now: DateTime<Utc>) -> f64 {
        let Some(model) = self.models.get(&provider) else {
            return CONFIDENCE_FLOOR;
        };
        let count = model.events.len();
        if count < self.config.confidence_min_events {
            return CONFIDENCE_FLOOR;
        }
        let week_ago = now - Duration::days(7);
        let recent = model.events.iter().filter(|e| e.occurred_at > week_ago).count();
        (count as f64 / 100.0).min(0.8) + (recent as f64 / 10.0).min(0.2)
    }

    fn risk_factors(
        &self,
        provider: ProviderType,
        metrics: &ProviderPerformanceMetrics,
    ) -> Vec<String> {
        let mut factors = Vec::new();
        if metrics.average_response_time_ms > RISK_FACTOR_RESPONSE_TIME_MS {
            factors.push("High response time".to_string());
        }
        if metrics.error_rate > RISK_FACTOR_ERROR_RATE {
            factors.push("High error rate".to_string());
        }
        if metrics.uptime_percentage < RISK_FACTOR_UPTIME_PERCENT {
            factors.push("Low uptime".to_string());
        }
        if self
            .monitor
            .geographic_info(provider)
            .is_some_and(|g| g.network_latency_ms > RISK_FACTOR_NETWORK_LATENCY_MS)
        {
            factors.push("High network latency".to_string());
        }
        if self.monitor.cost_per_operation(provider) > RISK_FACTOR_COST_PER_OP {
            factors.push("High operational cost".to_string());
        }
        if metrics.throughput_rps < RISK_FACTOR_THROUGHPUT_RPS {
            factors.push("Low throughput".to_string());
        }
        if let Some(model) = self.models.get(&provider) {
            let mut learned: Vec<&String> = model
                .risk_factors
                .iter()
                .filter(|(_, w)| **w >= LEARNED_RISK_FACTOR_THRESHOLD)
                .map(|(k, _)| k)
                .collect();
            learned.sort();
            factors.extend(learned.into_iter().map(|k| format!("Repeated failure: {k}")));
        }
        factors
    }

    // ---------------------------------------------------------------------
    // Scan
    // ---------------------------------------------------------------------

    /// Predict every known provider and act on those at `High` or above.
    ///
    /// Known providers are the union of registered, monitored and modelled
    /// ones. A failed preventive step is reported in its action entry and
    /// never aborts the scan.
    pub fn scan_and_prevent(&self) -> FailoverReport {
        let generated_at = Utc::now();
        let mut known: BTreeSet<ProviderType> =
            self.registry.list_available(None).into_iter().collect();
        known.extend(self.monitor.tracked_providers());
        known.extend(self.models.iter().map(|e| *e.key()));

        let predictions: Vec<ProviderFailurePrediction> =
            known.iter().map(|p| self.predict_failure(*p)).collect();
        let overall_risk = predictions
            .iter()
            .map(|p| p.risk_level)
            .max()
            .unwrap_or(RiskLevel::Unknown);
        let at_risk: Vec<ProviderType> = predictions
            .iter()
            .filter(|p| p.requires_action())
            .map(|p| p.provider)
            .collect();

        let mut preventive_actions = Vec::new();
        for prediction in predictions.iter().filter(|p| p.requires_action()) {
            let action = self
                .prevent(prediction, &at_risk)
                .unwrap_or_else(|e| {
                    warn!(
                        provider = %prediction.provider,
                        error = %e,
                        "Preventive failover failed"
                    );
                    PreventiveAction {
                        provider: prediction.provider,
                        action: PreventiveActionType::SwitchProvider,
                        alternative: None,
                        success: false,
                        details: e.to_string(),
                    }
                });
            preventive_actions.push(action);
        }

        if !at_risk.is_empty() {
            info!(
                overall_risk = %overall_risk,
                at_risk = at_risk.len(),
                "Predictive scan found at-risk providers"
            );
        }

        FailoverReport {
            generated_at,
            overall_risk,
            recommended_actions: report_actions(&predictions),
            predictions,
            preventive_actions,
        }
    }

    fn prevent(
        &self,
        prediction: &ProviderFailurePrediction,
        at_risk: &[ProviderType],
    ) -> Result<PreventiveAction> {
        let provider = prediction.provider;
        let candidates: Vec<ProviderType> = self
            .registry
            .list_available(None)
            .into_iter()
            .filter(|p| !at_risk.contains(p))
            .collect();
        let ranked = self.optimizer.recommend(RequestKind::LoadHolon, &candidates);
        let Some(best) = ranked.first().map(|r| r.provider) else {
            return Ok(PreventiveAction {
                provider,
                action: PreventiveActionType::IncreaseMonitoring,
                alternative: None,
                success: true,
                details: format!("No healthy alternative to {provider}; monitoring increased"),
            });
        };

        let mut switched = Vec::new();
        for category in ProviderCategory::ALL {
            if self.registry.current(category) != provider {
                continue;
            }
            let replacement = ranked
                .iter()
                .map(|r| r.provider)
                .find(|p| self.registry.is_registered(*p, Some(category)))
                .ok_or_else(|| {
                    Error::no_eligible_provider(
                        category,
                        format!("no healthy alternative to {provider} is registered"),
                    )
                })?;
            self.registry.switch_current(category, replacement)?;
            switched.push(category);
        }

        self.monitor.record_provider_switch(
            provider,
            best,
            format!("preventive failover at {} risk", prediction.risk_level),
        );
        telemetry::record_preventive_failover(provider);
        info!(from = %provider, to = %best, risk = %prediction.risk_level, "Preventive failover");

        let details = if switched.is_empty() {
            format!("Traffic steered from {provider} to {best}")
        } else {
            let names: Vec<String> = switched.iter().map(ToString::to_string).collect();
            format!("Current {} provider switched from {provider} to {best}", names.join(", "))
        };
        Ok(PreventiveAction {
            provider,
            action: PreventiveActionType::SwitchProvider,
            alternative: Some(best),
            success: true,
            details,
        })
    }
}

/// Step function of probability; higher risk never yields a later failure
pub fn time_to_failure(probability: f64) -> Duration {
    match RiskLevel::from_probability(probability) {
        RiskLevel::Critical => Duration::minutes(30),
        RiskLevel::High => Duration::hours(2),
        RiskLevel::Medium => Duration::hours(12),
        RiskLevel::Low => Duration::days(1),
        RiskLevel::VeryLow | RiskLevel::Unknown => Duration::days(7),
    }
}

fn provider_actions(probability: f64, risk_factors: &[String]) -> Vec<String> {
    let tiered: &[&str] = if probability > 0.8 {
        &[
            "Immediate failover recommended",
            "Prepare backup providers",
            "Increase monitoring frequency",
        ]
    } else if probability > 0.6 {
        &[
            "Monitor closely",
            "Prepare failover procedures",
            "Review provider configuration",
        ]
    } else if probability > 0.4 {
        &["Continue monitoring", "Review performance metrics"]
    } else {
        &["Normal operation"]
    };
    let mut actions: Vec<String> = tiered.iter().map(ToString::to_string).collect();
    for (factor, action) in [
        ("High response time", "Optimize request patterns"),
        ("High error rate", "Review error handling"),
        ("Low uptime", "Check provider health"),
    ] {
        if risk_factors.iter().any(|f| f == factor) {
            actions.push(action.to_string());
        }
    }
    actions
}

fn report_actions(predictions: &[ProviderFailurePrediction]) -> Vec<String> {
    let mut actions = Vec::new();
    if predictions.iter().any(|p| p.risk_level == RiskLevel::Critical) {
        actions.push("Immediate action required for critical providers".to_string());
        actions.push("Initiate emergency failover procedures".to_string());
    }
    if predictions.iter().any(|p| p.risk_level == RiskLevel::High) {
        actions.push("Prepare for potential failover".to_string());
        actions.push("Review backup provider availability".to_string());
    }
    if predictions.iter().any(|p| p.failure_probability > 0.5) {
        actions.push("Increase monitoring frequency".to_string());
        actions.push("Prepare failover resources".to_string());
    }
    actions
}
