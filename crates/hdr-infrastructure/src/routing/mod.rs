//! Routing core
//!
//! | Module | Contents |
//! |--------|----------|
//! | `registry` | Provider instances, auto lists, current pointers |
//! | `performance` | Rolling metrics and composite scores |
//! | `optimization` | Reputation and candidate ranking |
//! | `predictive` | Failure prediction and preventive switches |
//! | `quota` | Plan limits and usage accounting |
//! | `router` | Request orchestration |
//! | `telemetry` | `metrics` facade wrappers |

pub mod optimization;
pub mod performance;
pub mod predictive;
pub mod quota;
pub mod registry;
pub mod router;
pub mod telemetry;

pub use optimization::{
    OptimizationEngine, OptimizationRecommendation, PerformanceSample, Priority,
    ProviderRecommendation, RecommendationKind,
};
pub use performance::{
    CostAnalysis, GeographicInfo, PerformanceMonitor, ProviderPerformanceMetrics, ProviderSwitch,
};
pub use predictive::{
    FailoverReport, PredictiveFailoverEngine, PreventiveAction, PreventiveActionType,
    ProviderFailurePrediction,
};
pub use quota::{InMemoryUsageTracker, QuotaGuard, QuotaReservation};
pub use registry::{AutoList, CategorySnapshot, ProviderInstance, ProviderPin, ProviderRegistry};
pub use router::{
    HolonOperation, HyperDriveRouter, OperationOutput, Replicated, Routed, RoutingRequest,
};
