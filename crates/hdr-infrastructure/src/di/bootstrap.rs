//! Service bootstrap
//!
//! ```text
//! AppConfig → Registry ─┬→ PerformanceMonitor → OptimizationEngine ─┐
//!                       └──────────────→ PredictiveFailoverEngine ←─┤
//!                         QuotaGuard ──→ HyperDriveRouter ←─────────┘
//!                                             ↓
//!                                        HolonManager
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let context = init_app(AppConfig::default())?;
//! context.router().register_provider(ProviderCategory::Storage, Arc::new(provider))?;
//! let loaded = context.holons().load_holon(key, &LoadOptions::default()).await?;
//! ```

use crate::config::AppConfig;
use crate::config::loader::validate_app_config;
use crate::holons::HolonManager;
use crate::routing::{
    AutoList, HyperDriveRouter, InMemoryUsageTracker, OptimizationEngine, PerformanceMonitor,
    PredictiveFailoverEngine, ProviderRegistry, QuotaGuard,
};
use hdr_domain::error::Result;
use hdr_domain::ports::UsageTracker;
use hdr_domain::value_objects::ProviderCategory;
use std::sync::Arc;
use tracing::info;

/// Shared routing services
pub struct AppContext {
    /// Application configuration
    pub config: Arc<AppConfig>,

    registry: Arc<ProviderRegistry>,
    monitor: Arc<PerformanceMonitor>,
    optimizer: Arc<OptimizationEngine>,
    predictive: Arc<PredictiveFailoverEngine>,
    quota: Arc<QuotaGuard>,
    router: Arc<HyperDriveRouter>,
    holons: Arc<HolonManager>,
}

impl AppContext {
    pub fn registry(&self) -> Arc<ProviderRegistry> {
        self.registry.clone()
    }

    pub fn monitor(&self) -> Arc<PerformanceMonitor> {
        self.monitor.clone()
    }

    pub fn optimizer(&self) -> Arc<OptimizationEngine> {
        self.optimizer.clone()
    }

    pub fn predictive(&self) -> Arc<PredictiveFailoverEngine> {
        self.predictive.clone()
    }

    pub fn quota(&self) -> Arc<QuotaGuard> {
        self.quota.clone()
    }

    pub fn router(&self) -> Arc<HyperDriveRouter> {
        self.router.clone()
    }

    pub fn holons(&self) -> Arc<HolonManager> {
        self.holons.clone()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("router", &self.router)
            .field("plan", &self.config.subscription.plan_type)
            .finish_non_exhaustive()
    }
}

/// Validate the configuration and build every routing service with an
/// in-memory usage tracker
pub fn init_app(config: AppConfig) -> Result<AppContext> {
    init_app_with_usage(config, Arc::new(InMemoryUsageTracker::new()))
}

/// Like [`init_app`] with a caller-supplied usage tracker
pub fn init_app_with_usage(config: AppConfig, usage: Arc<dyn UsageTracker>) -> Result<AppContext> {
    validate_app_config(&config)?;
    let config = Arc::new(config);

    let registry = Arc::new(ProviderRegistry::new());
    let routing = &config.routing;
    let storage = ProviderCategory::Storage;
    registry.set_auto_failover_list(storage, &routing.auto_failover_providers);
    registry.set_auto_replication_list(storage, &routing.auto_replication_providers);
    registry.set_auto_load_balance_list(storage, &routing.auto_load_balance_providers);
    registry.set_enabled(AutoList::Failover, routing.auto_failover_enabled);
    registry.set_enabled(AutoList::Replication, routing.auto_replication_enabled);
    registry.set_enabled(AutoList::LoadBalance, routing.auto_load_balance_enabled);

    let monitor = Arc::new(PerformanceMonitor::new(config.scoring.clone()));
    let optimizer = Arc::new(OptimizationEngine::new(
        config.optimization.clone(),
        monitor.clone(),
    ));
    let predictive = Arc::new(PredictiveFailoverEngine::new(
        config.prediction.clone(),
        monitor.clone(),
        optimizer.clone(),
        registry.clone(),
    ));
    let quota = Arc::new(QuotaGuard::new(config.subscription.clone(), usage));
    let router = Arc::new(HyperDriveRouter::new(
        config.routing.clone(),
        registry.clone(),
        monitor.clone(),
        optimizer.clone(),
        predictive.clone(),
        quota.clone(),
    ));
    let holons = Arc::new(HolonManager::new(router.clone()));

    info!(
        plan = %config.subscription.plan_type,
        strategy = %config.routing.default_strategy,
        "Routing services initialized"
    );

    Ok(AppContext {
        config,
        registry,
        monitor,
        optimizer,
        predictive,
        quota,
        router,
        holons,
    })
}
