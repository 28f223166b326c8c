//! HyperDrive router
//!
//! Entry point for logical holon operations. Each request runs
//! `quota check -> select -> attempt -> failover loop -> record outcome`;
//! provider I/O happens only in the attempt step and never under a lock.

use super::optimization::OptimizationEngine;
use super::performance::PerformanceMonitor;
use super::predictive::{FailoverReport, PredictiveFailoverEngine};
use super::quota::{QuotaGuard, QuotaReservation};
use super::registry::{AutoList, ProviderInstance, ProviderRegistry};
use super::telemetry;
use crate::config::RoutingConfig;
use futures::future::join_all;
use hdr_domain::entities::{Holon, HolonFilter, HolonKey, MetadataQuery};
use hdr_domain::error::{Error, Result};
use hdr_domain::ports::HolonProvider;
use hdr_domain::value_objects::{
    FailureEvent, FailureType, LoadBalancingStrategy, OperationClass, Outcome,
    ProviderCategory, ProviderType, RequestKind,
};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Logical operation carried by a routing request
#[derive(Debug, Clone, PartialEq)]
pub enum HolonOperation {
    Load(HolonKey),
    LoadForParent { parent: HolonKey, filter: HolonFilter },
    LoadByMetadata(MetadataQuery),
    Save(Holon),
}

impl HolonOperation {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Load(_) => RequestKind::LoadHolon,
            Self::LoadForParent { .. } => RequestKind::LoadHolonsForParent,
            Self::LoadByMetadata(_) => RequestKind::LoadHolonsByMetadata,
            Self::Save(_) => RequestKind::SaveHolon,
        }
    }

    async fn dispatch(&self, provider: &dyn HolonProvider) -> Result<Outcome<OperationOutput>> {
        match self {
            Self::Load(key) => Ok(provider.load_holon(key).await?.map(OperationOutput::Holon)),
            Self::LoadForParent { parent, filter } => Ok(provider
                .load_holons_for_parent(parent, filter)
                .await?
                .map(OperationOutput::Holons)),
            Self::LoadByMetadata(query) => Ok(provider
                .load_holons_by_metadata(query)
                .await?
                .map(OperationOutput::Holons)),
            Self::Save(holon) => Ok(provider.save_holon(holon).await?.map(OperationOutput::Holon)),
        }
    }
}

/// Value produced by a provider for an operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationOutput {
    Holon(Holon),
    Holons(Vec<Holon>),
}

impl OperationOutput {
    /// The single holon of a load or save
    pub fn into_holon(self) -> Result<Holon> {
        match self {
            Self::Holon(holon) => Ok(holon),
            Self::Holons(_) => Err(Error::internal("expected a single holon, got a list")),
        }
    }

    /// The holons of a list load
    pub fn into_holons(self) -> Result<Vec<Holon>> {
        match self {
            Self::Holons(holons) => Ok(holons),
            Self::Holon(_) => Err(Error::internal("expected a holon list, got a single holon")),
        }
    }
}

/// Immutable routing input
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingRequest {
    id: Uuid,
    operation: HolonOperation,
    category: ProviderCategory,
    preferred_provider: ProviderType,
}

impl RoutingRequest {
    /// Storage request with no preferred provider
    pub fn new(operation: HolonOperation) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation,
            category: ProviderCategory::Storage,
            preferred_provider: ProviderType::Default,
        }
    }

    #[must_use]
    pub fn in_category(mut self, category: ProviderCategory) -> Self {
        self.category = category;
        self
    }

    /// Try this provider first; `Default` leaves the choice to the strategy
    #[must_use]
    pub fn prefer(mut self, provider: ProviderType) -> Self {
        self.preferred_provider = provider;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn operation(&self) -> &HolonOperation {
        &self.operation
    }

    pub fn kind(&self) -> RequestKind {
        self.operation.kind()
    }

    pub fn category(&self) -> ProviderCategory {
        self.category
    }

    pub fn preferred_provider(&self) -> ProviderType {
        self.preferred_provider
    }
}

/// A routed success
#[derive(Debug, Clone, Serialize)]
pub struct Routed<T> {
    pub value: T,
    /// Provider that served the request
    pub provider: ProviderType,
    /// Every provider tried, in order, the serving one last
    pub attempted: Vec<ProviderType>,
    pub warnings: Vec<String>,
}

impl<T> Routed<T> {
    pub fn is_warning(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Routed<U> {
        Routed {
            value: f(self.value),
            provider: self.provider,
            attempted: self.attempted,
            warnings: self.warnings,
        }
    }
}

/// Result of a best-effort fan-out
#[derive(Debug, Clone, Serialize)]
pub struct Replicated {
    pub targets: Vec<ProviderType>,
    pub results: Vec<(ProviderType, OperationOutput)>,
    pub failures: Vec<(ProviderType, String)>,
    /// Number of targets that succeeded
    pub satisfied: usize,
}

impl Replicated {
    pub fn is_complete(&self) -> bool {
        self.satisfied == self.targets.len()
    }
}

#[derive(Debug, Default)]
struct RouterStats {
    requests: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    failovers: AtomicU64,
    replications: AtomicU64,
    quota_rejections: AtomicU64,
}

/// Which providers a selection may draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pool {
    Registered,
    LoadBalance,
}

/// Multi-backend router
///
/// Long-lived service object; construct once per process and share it.
pub struct HyperDriveRouter {
    config: RoutingConfig,
    registry: Arc<ProviderRegistry>,
    monitor: Arc<PerformanceMonitor>,
    optimizer: Arc<OptimizationEngine>,
    predictive: Arc<PredictiveFailoverEngine>,
    quota: Arc<QuotaGuard>,
    cursor: AtomicUsize,
    stats: RouterStats,
}

impl HyperDriveRouter {
    pub fn new(
        config: RoutingConfig,
        registry: Arc<ProviderRegistry>,
        monitor: Arc<PerformanceMonitor>,
        optimizer: Arc<OptimizationEngine>,
        predictive: Arc<PredictiveFailoverEngine>,
        quota: Arc<QuotaGuard>,
    ) -> Self {
        Self {
            config,
            registry,
            monitor,
            optimizer,
            predictive,
            quota,
            cursor: AtomicUsize::new(0),
            stats: RouterStats::default(),
        }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn monitor(&self) -> &Arc<PerformanceMonitor> {
        &self.monitor
    }

    pub fn optimizer(&self) -> &Arc<OptimizationEngine> {
        &self.optimizer
    }

    pub fn predictive(&self) -> &Arc<PredictiveFailoverEngine> {
        &self.predictive
    }

    pub fn quota(&self) -> &Arc<QuotaGuard> {
        &self.quota
    }

    // ---------------------------------------------------------------------
    // Entry points
    // ---------------------------------------------------------------------

    /// Route a request under `strategy`, failing over on error
    pub async fn route(
        &self,
        request: RoutingRequest,
        strategy: LoadBalancingStrategy,
    ) -> Result<Routed<OperationOutput>> {
        self.execute(&request, strategy, Pool::Registered).await
    }

    /// Like [`route`](Self::route) but draws from the load-balance list
    /// when load balancing is enabled
    pub async fn load_balance(
        &self,
        request: RoutingRequest,
        strategy: LoadBalancingStrategy,
    ) -> Result<Routed<OperationOutput>> {
        self.execute(&request, strategy, Pool::LoadBalance).await
    }

    /// Walk the failover list from its start until one provider succeeds
    pub async fn failover(&self, request: RoutingRequest) -> Result<Routed<OperationOutput>> {
        let reservation = self.reserve(request.kind().operation_class())?;
        self.stats.requests.fetch_add(1, Ordering::Relaxed);

        let category = request.category();
        let candidates: Vec<ProviderType> = self
            .registry
            .list(category, AutoList::Failover)
            .into_iter()
            .filter(|p| self.registry.is_registered(*p, Some(category)) && self.quota.allows(*p))
            .collect();
        if candidates.is_empty() {
            return Err(Error::no_eligible_provider(
                category,
                "the failover list has no registered provider the plan allows",
            ));
        }

        self.reserve(OperationClass::Failovers)?.commit();
        self.stats.failovers.fetch_add(1, Ordering::Relaxed);
        telemetry::record_failover(candidates[0]);

        let mut attempted = Vec::with_capacity(candidates.len());
        let mut last_error = None;
        for provider in candidates {
            attempted.push(provider);
            match self.attempt(provider, &request).await {
                Ok(outcome) => return Ok(self.succeed(reservation, provider, attempted, outcome)),
                Err(e) => last_error = Some(e),
            }
        }
        Err(self.exhausted(&request, attempted, last_error))
    }

    /// Fan the request out to every replication target concurrently.
    ///
    /// Partial success is success; only zero satisfied targets is an error.
    pub async fn replicate(&self, request: RoutingRequest) -> Result<Replicated> {
        self.check_quota(request.kind().operation_class())?;
        self.stats.requests.fetch_add(1, Ordering::Relaxed);

        let category = request.category();
        let targets: Vec<ProviderType> = self
            .registry
            .list(category, AutoList::Replication)
            .into_iter()
            .filter(|p| self.registry.is_registered(*p, Some(category)) && self.quota.allows(*p))
            .collect();
        if targets.is_empty() {
            return Err(Error::no_eligible_provider(
                category,
                "the replication list has no registered provider the plan allows",
            ));
        }

        let replicated = self.replicate_to(&request, targets).await;
        if replicated.satisfied == 0 {
            self.stats.failures.fetch_add(1, Ordering::Relaxed);
            let last = replicated
                .failures
                .last()
                .map(|(_, m)| m.clone())
                .unwrap_or_default();
            return Err(Error::all_providers_failed(
                format!("replicate {}", request.kind()),
                replicated.targets,
                last,
            ));
        }
        self.stats.successes.fetch_add(1, Ordering::Relaxed);
        Ok(replicated)
    }

    /// Send the request to each target concurrently and collect the results.
    ///
    /// Every target takes its own replication unit before it is attempted
    /// and keeps it only if the copy succeeds.
    pub async fn replicate_to(
        &self,
        request: &RoutingRequest,
        targets: Vec<ProviderType>,
    ) -> Replicated {
        let attempts = targets.iter().map(|p| async move {
            let reservation = match self.reserve(OperationClass::Replications) {
                Ok(reservation) => reservation,
                Err(e) => return (*p, Err(e)),
            };
            let result = self.attempt(*p, request).await;
            if result.is_ok() {
                reservation.commit();
            }
            (*p, result)
        });
        let mut replicated = Replicated {
            targets: targets.clone(),
            results: Vec::new(),
            failures: Vec::new(),
            satisfied: 0,
        };
        for (provider, result) in join_all(attempts).await {
            match result {
                Ok(outcome) => {
                    replicated.satisfied += 1;
                    replicated.results.push((provider, outcome.value));
                }
                Err(e) => replicated.failures.push((provider, e.to_string())),
            }
        }
        self.stats
            .replications
            .fetch_add(replicated.satisfied as u64, Ordering::Relaxed);
        info!(
            operation = %request.kind(),
            satisfied = replicated.satisfied,
            targets = replicated.targets.len(),
            "Replication finished"
        );
        replicated
    }

    /// Score every known provider and switch away from those at risk
    pub fn predict_and_prevent(&self) -> FailoverReport {
        self.predictive.scan_and_prevent()
    }

    // ---------------------------------------------------------------------
    // Administration
    // ---------------------------------------------------------------------

    /// Register an instance; the configured current storage provider
    /// becomes current as soon as it is registered
    pub fn register_provider(
        &self,
        category: ProviderCategory,
        instance: ProviderInstance,
    ) -> Result<()> {
        let id = instance.provider_type();
        if id.is_default() {
            return Err(Error::invalid_argument("cannot register a provider as Default"));
        }
        self.registry.register(category, id, instance);
        if category == ProviderCategory::Storage
            && id == self.config.current_storage_provider
            && self.registry.current(category).is_default()
        {
            self.registry.switch_current(category, id)?;
        }
        Ok(())
    }

    pub fn set_auto_failover_list(&self, category: ProviderCategory, providers: &[ProviderType]) {
        self.registry.set_auto_failover_list(category, providers);
    }

    pub fn set_auto_replication_list(
        &self,
        category: ProviderCategory,
        providers: &[ProviderType],
    ) {
        self.registry.set_auto_replication_list(category, providers);
    }

    pub fn set_auto_load_balance_list(
        &self,
        category: ProviderCategory,
        providers: &[ProviderType],
    ) {
        self.registry.set_auto_load_balance_list(category, providers);
    }

    /// Counters and registry state as JSON
    pub fn stats(&self) -> serde_json::Value {
        let s = &self.stats;
        let usage: serde_json::Map<String, serde_json::Value> = OperationClass::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), serde_json::json!(self.quota.usage(*c))))
            .collect();
        serde_json::json!({
            "requests": s.requests.load(Ordering::Relaxed),
            "successes": s.successes.load(Ordering::Relaxed),
            "failures": s.failures.load(Ordering::Relaxed),
            "failovers": s.failovers.load(Ordering::Relaxed),
            "replications": s.replications.load(Ordering::Relaxed),
            "quota_rejections": s.quota_rejections.load(Ordering::Relaxed),
            "plan": self.quota.subscription().plan_type,
            "usage": usage,
            "registry": self.registry.snapshot(),
            "tracked_providers": self.monitor.tracked_providers(),
        })
    }

    // ---------------------------------------------------------------------
    // Request pipeline
    // ---------------------------------------------------------------------

    async fn execute(
        &self,
        request: &RoutingRequest,
        strategy: LoadBalancingStrategy,
        pool: Pool,
    ) -> Result<Routed<OperationOutput>> {
        let reservation = self.reserve(request.kind().operation_class())?;
        self.stats.requests.fetch_add(1, Ordering::Relaxed);

        let category = request.category();
        let current_default = self.registry.current(category);
        let first = self.select_provider(request, strategy, pool)?;

        let mut attempted = vec![first];
        let mut last_error = match self.attempt(first, request).await {
            Ok(outcome) => return Ok(self.succeed(reservation, first, attempted, outcome)),
            Err(e) => e,
        };

        if !self.registry.is_enabled(AutoList::Failover) {
            return Err(self.exhausted(request, attempted, Some(last_error)));
        }
        let candidates: Vec<ProviderType> = self
            .registry
            .list(category, AutoList::Failover)
            .into_iter()
            .filter(|p| *p != first && *p != current_default && self.quota.allows(*p))
            .filter(|p| self.registry.is_registered(*p, Some(category)))
            .collect();
        if candidates.is_empty() {
            return Err(self.exhausted(request, attempted, Some(last_error)));
        }

        match self.reserve(OperationClass::Failovers) {
            Ok(failover) => failover.commit(),
            Err(e) => {
                warn!(
                    request = %request.id(),
                    error = %last_error,
                    "Failover skipped, quota reached"
                );
                return Err(e);
            }
        }
        self.stats.failovers.fetch_add(1, Ordering::Relaxed);
        telemetry::record_failover(first);
        warn!(
            request = %request.id(),
            from = %first,
            error = %last_error,
            "Provider failed, entering failover"
        );

        for provider in candidates {
            attempted.push(provider);
            match self.attempt(provider, request).await {
                Ok(outcome) => return Ok(self.succeed(reservation, provider, attempted, outcome)),
                Err(e) => last_error = e,
            }
        }
        Err(self.exhausted(request, attempted, Some(last_error)))
    }

    fn check_quota(&self, class: OperationClass) -> Result<()> {
        self.quota.check(class).inspect_err(|_| {
            self.stats.quota_rejections.fetch_add(1, Ordering::Relaxed);
        })
    }

    fn reserve(&self, class: OperationClass) -> Result<QuotaReservation> {
        self.quota.reserve(class).inspect_err(|_| {
            self.stats.quota_rejections.fetch_add(1, Ordering::Relaxed);
        })
    }

    fn succeed(
        &self,
        reservation: QuotaReservation,
        provider: ProviderType,
        attempted: Vec<ProviderType>,
        outcome: Outcome<OperationOutput>,
    ) -> Routed<OperationOutput> {
        reservation.commit();
        self.stats.successes.fetch_add(1, Ordering::Relaxed);
        Routed {
            value: outcome.value,
            provider,
            attempted,
            warnings: outcome.warnings,
        }
    }

    fn exhausted(
        &self,
        request: &RoutingRequest,
        attempted: Vec<ProviderType>,
        last: Option<Error>,
    ) -> Error {
        self.stats.failures.fetch_add(1, Ordering::Relaxed);
        let message = last.map_or_else(
            || "no provider was attempted".to_string(),
            |e| e.to_string(),
        );
        error!(request = %request.id(), attempted = ?attempted, "All providers failed");
        Error::all_providers_failed(request.kind().to_string(), attempted, message)
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Providers of the category the plan may use, in registration order
    fn eligible(&self, category: ProviderCategory, pool: Pool) -> Result<Vec<ProviderType>> {
        let registered = self.registry.list_available(Some(category));
        if registered.is_empty() {
            return Err(Error::no_eligible_provider(category, "no providers registered"));
        }
        let mut eligible: Vec<ProviderType> =
            registered.into_iter().filter(|p| self.quota.allows(*p)).collect();
        if eligible.is_empty() {
            return Err(Error::no_eligible_provider(
                category,
                format!(
                    "no registered provider is allowed on the {} plan",
                    self.quota.subscription().plan_type
                ),
            ));
        }
        if pool == Pool::LoadBalance && self.registry.is_enabled(AutoList::LoadBalance) {
            let balanced = self.registry.list(category, AutoList::LoadBalance);
            let restricted: Vec<ProviderType> =
                eligible.iter().copied().filter(|p| balanced.contains(p)).collect();
            if !restricted.is_empty() {
                eligible = restricted;
            }
        }
        Ok(eligible)
    }

    /// Pick the first provider to attempt.
    ///
    /// Only an empty eligible set is an error; a strategy that cannot decide
    /// falls back to the current default.
    fn select_provider(
        &self,
        request: &RoutingRequest,
        strategy: LoadBalancingStrategy,
        pool: Pool,
    ) -> Result<ProviderType> {
        let category = request.category();
        let eligible = self.eligible(category, pool)?;

        let preferred = request.preferred_provider();
        if !preferred.is_default() && eligible.contains(&preferred) {
            telemetry::record_selection(preferred, strategy);
            return Ok(preferred);
        }

        let chosen = self.choose(request.kind(), strategy, &eligible).unwrap_or_else(|| {
            let current = self.registry.current(category);
            let fallback = if eligible.contains(&current) { current } else { eligible[0] };
            debug!(
                strategy = %strategy,
                fallback = %fallback,
                "Strategy undecided, using default provider"
            );
            fallback
        });
        telemetry::record_selection(chosen, strategy);
        Ok(chosen)
    }

    fn choose(
        &self,
        kind: RequestKind,
        strategy: LoadBalancingStrategy,
        eligible: &[ProviderType],
    ) -> Option<ProviderType> {
        if eligible.is_empty() {
            return None;
        }
        match strategy {
            LoadBalancingStrategy::RoundRobin => {
                let slot = self.cursor.fetch_add(1, Ordering::Relaxed) % eligible.len();
                Some(eligible[slot])
            }
            LoadBalancingStrategy::WeightedRoundRobin => self.weighted_draw(eligible),
            LoadBalancingStrategy::CostBased => self.cost_based(eligible),
            LoadBalancingStrategy::Auto => self
                .optimizer
                .recommend(kind, eligible)
                .first()
                .map(|r| r.provider),
            LoadBalancingStrategy::LeastConnections
            | LoadBalancingStrategy::Geographic
            | LoadBalancingStrategy::Performance => {
                self.monitor.get_best_provider(eligible, strategy)
            }
        }
    }

    /// Draw proportionally to the composite score
    fn weighted_draw(&self, eligible: &[ProviderType]) -> Option<ProviderType> {
        let weights: Vec<f64> = eligible.iter().map(|p| self.monitor.overall_score(*p)).collect();
        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return None;
        }
        let mut point = rand::rng().random_range(0.0..total);
        for (provider, weight) in eligible.iter().zip(&weights) {
            if point < *weight {
                return Some(*provider);
            }
            point -= weight;
        }
        eligible.last().copied()
    }

    /// Cheapest provider the plan makes sense for: free providers first on
    /// cost-restricted plans, then anything outside the high-cost list
    fn cost_based(&self, eligible: &[ProviderType]) -> Option<ProviderType> {
        let subscription = self.quota.subscription();
        if subscription.plan_type.is_cost_restricted() {
            let free: Vec<ProviderType> = eligible
                .iter()
                .copied()
                .filter(|p| subscription.is_free_provider(*p))
                .collect();
            if !free.is_empty() {
                return self.monitor.get_best_provider(&free, LoadBalancingStrategy::CostBased);
            }
            let affordable: Vec<ProviderType> = eligible
                .iter()
                .copied()
                .filter(|p| !subscription.is_high_cost_provider(*p))
                .collect();
            if !affordable.is_empty() {
                return self
                    .monitor
                    .get_best_provider(&affordable, LoadBalancingStrategy::CostBased);
            }
        }
        self.monitor.get_best_provider(eligible, LoadBalancingStrategy::CostBased)
    }

    // ---------------------------------------------------------------------
    // Attempt
    // ---------------------------------------------------------------------

    /// One bounded call to one provider, recorded whatever the result.
    ///
    /// The category is pinned to `provider` for the duration of the call.
    pub async fn attempt(
        &self,
        provider: ProviderType,
        request: &RoutingRequest,
    ) -> Result<Outcome<OperationOutput>> {
        let category = request.category();
        let kind = request.kind();
        let instance = match self.registry.get(category, provider) {
            Ok(instance) => instance,
            Err(e) => {
                self.record_outcome(provider, kind, Err(&e), 0.0);
                return Err(e);
            }
        };
        let _pin = self.registry.pin(category, provider);
        let connection = ConnectionGuard::open(&self.monitor, provider);

        let started = Instant::now();
        let timeout = self.config.provider_call_timeout();
        let call = async {
            if !instance.is_active() && !instance.activate().await? {
                return Err(Error::provider(provider, "activation refused"));
            }
            request.operation().dispatch(instance.as_ref()).await
        };
        let result = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(provider, timeout.as_secs())),
        };
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        drop(connection);

        self.record_outcome(provider, kind, result.as_ref().map(|_| ()), latency_ms);
        result
    }

    fn record_outcome(
        &self,
        provider: ProviderType,
        kind: RequestKind,
        result: std::result::Result<(), &Error>,
        latency_ms: f64,
    ) {
        let success = result.is_ok();
        let cost = self.monitor.cost_per_operation(provider);
        self.monitor.record_request(provider, success, latency_ms, cost);
        self.optimizer.record_outcome(
            provider,
            kind,
            success,
            latency_ms,
            result.err().map(ToString::to_string),
        );
        telemetry::record_attempt(provider, kind, success, latency_ms);

        if let Err(e) = result {
            let (failure_type, cause) = classify_failure(e);
            let event = FailureEvent::new(provider, failure_type, cause, e.to_string());
            self.predictive.record_failure_event(event);
            debug!(provider = %provider, operation = %kind, error = %e, "Attempt failed");
        }
    }
}

/// Open connection to a provider, closed when dropped.
///
/// Dropping covers every exit from an attempt, including a caller that
/// abandons the attempt future mid-call.
struct ConnectionGuard<'a> {
    monitor: &'a PerformanceMonitor,
    provider: ProviderType,
}

impl<'a> ConnectionGuard<'a> {
    fn open(monitor: &'a PerformanceMonitor, provider: ProviderType) -> Self {
        let connections = monitor.record_connection(provider, true);
        telemetry::update_active_connections(provider, connections);
        Self { monitor, provider }
    }
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        let connections = self.monitor.record_connection(self.provider, false);
        telemetry::update_active_connections(self.provider, connections);
    }
}

/// Failure type and cause recorded for a failed attempt
fn classify_failure(error: &Error) -> (FailureType, &'static str) {
    match error {
        Error::Timeout { .. } => (FailureType::Timeout, "deadline_exceeded"),
        Error::NotFound { .. } => (FailureType::ServiceUnavailable, "not_found"),
        Error::Provider { .. } => (FailureType::ServiceUnavailable, "provider_error"),
        Error::Io { .. } | Error::IoSimple { .. } => (FailureType::ConnectionError, "io"),
        _ => (FailureType::ConnectionError, "unexpected"),
    }
}

impl std::fmt::Debug for HyperDriveRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperDriveRouter")
            .field("default_strategy", &self.config.default_strategy)
            .field("provider_call_timeout_secs", &self.config.provider_call_timeout_secs)
            .field("registered", &self.registry.list_available(None))
            .finish_non_exhaustive()
    }
}
