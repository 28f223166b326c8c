//! Infrastructure layer constants
//!
//! Defaults for every tunable knob. Configuration types take their
//! `Default` values from here.

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "HDR";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "hdr.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "hdr";

// ============================================================================
// LOGGING
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable that overrides the log filter
pub const LOG_ENV_FILTER: &str = "HDR_LOG";

/// File stem for rotated log files
pub const LOG_FILE_STEM: &str = "hdr";

// ============================================================================
// ROUTING
// ============================================================================

/// Per-attempt provider call timeout in seconds
pub const DEFAULT_PROVIDER_CALL_TIMEOUT_SECS: u64 = 10;

/// Largest accepted provider call timeout in seconds
pub const MAX_PROVIDER_CALL_TIMEOUT_SECS: u64 = 600;

// ============================================================================
// PERFORMANCE MONITOR
// ============================================================================

/// Composite score weight of the performance sub-score
pub const SCORE_WEIGHT_PERFORMANCE: f64 = 0.4;

/// Composite score weight of the cost sub-score
pub const SCORE_WEIGHT_COST: f64 = 0.3;

/// Composite score weight of the availability sub-score
pub const SCORE_WEIGHT_AVAILABILITY: f64 = 0.3;

/// Performance sub-score weight of the latency term
pub const PERF_WEIGHT_LATENCY: f64 = 0.4;

/// Performance sub-score weight of the throughput term
pub const PERF_WEIGHT_THROUGHPUT: f64 = 0.3;

/// Performance sub-score weight of the error-rate term
pub const PERF_WEIGHT_ERRORS: f64 = 0.3;

/// Milliseconds of latency per point lost in the latency term
pub const LATENCY_MS_PER_POINT: f64 = 10.0;

/// Points gained per request/second in the throughput term
pub const THROUGHPUT_POINTS_PER_RPS: f64 = 10.0;

/// Points lost per cost unit per operation
pub const COST_POINTS_PER_UNIT: f64 = 100.0;

/// Geography score weight of the network latency term
pub const GEO_WEIGHT_LATENCY: f64 = 0.7;

/// Geography score weight of the hop count term
pub const GEO_WEIGHT_HOPS: f64 = 0.3;

/// Points lost per millisecond of network latency
pub const GEO_POINTS_PER_LATENCY_MS: f64 = 10.0;

/// Points lost per network hop
pub const GEO_POINTS_PER_HOP: f64 = 5.0;

/// Default weights for strategy-specific weighted scores
pub const WEIGHTED_SCORE_PERFORMANCE: f64 = 0.4;
pub const WEIGHTED_SCORE_COST: f64 = 0.3;
pub const WEIGHTED_SCORE_GEOGRAPHY: f64 = 0.2;
pub const WEIGHTED_SCORE_AVAILABILITY: f64 = 0.1;

/// Sliding window used to compute throughput
pub const THROUGHPUT_WINDOW_SECS: u64 = 60;

/// Retention of the provider switch log
pub const SWITCH_LOG_RETENTION_HOURS: i64 = 24;

// ============================================================================
// OPTIMIZATION ENGINE
// ============================================================================

/// Samples older than this are pruned
pub const HISTORY_RETENTION_DAYS: i64 = 7;

/// Window of the historical performance factor
pub const RECENT_WINDOW_HOURS: i64 = 24;

/// Window of the recent load factor
pub const LOAD_WINDOW_SECS: i64 = 300;

/// Request count at which the load factor bottoms out
pub const LOAD_CEILING: u64 = 100;

/// Bounded multiplicative jitter applied to blended scores
pub const SCORE_JITTER: f64 = 0.1;

/// Minimum samples before retraining overwrites a reputation
pub const RETRAIN_MIN_SAMPLES: usize = 10;

/// Reputation nudge per recorded outcome
pub const OUTCOME_NUDGE: f64 = 0.1;

/// Largest latency bonus or penalty per recorded outcome
pub const LATENCY_NUDGE: f64 = 0.02;

/// Latency treated as the worst case by normalized response-time terms
pub const LATENCY_REFERENCE_MS: f64 = 1000.0;

/// Number of candidates returned by a recommendation
pub const RECOMMENDATION_LIMIT: usize = 5;

/// Hard cap on retained samples per provider
pub const MAX_SAMPLES_PER_PROVIDER: usize = 10_000;

/// Factor weights of the blended score
pub const FACTOR_WEIGHT_HISTORY: f64 = 0.4;
pub const FACTOR_WEIGHT_AFFINITY: f64 = 0.3;
pub const FACTOR_WEIGHT_LOAD: f64 = 0.2;
pub const FACTOR_WEIGHT_COST: f64 = 0.1;

/// Success rate below which a reliability recommendation is raised
pub const RELIABILITY_ALERT_SUCCESS_RATE: f64 = 0.95;

// ============================================================================
// PREDICTIVE FAILOVER
// ============================================================================

/// Response time at which the response-time term saturates
pub const RESPONSE_TIME_CEILING_MS: f64 = 2000.0;

/// Network latency at which the geography term saturates
pub const NETWORK_LATENCY_CEILING_MS: f64 = 500.0;

/// Cost per operation at which the cost term saturates
pub const COST_CEILING: f64 = 1.0;

/// Failure-probability term weights
pub const RISK_WEIGHT_RESPONSE_TIME: f64 = 0.3;
pub const RISK_WEIGHT_ERROR_RATE: f64 = 0.25;
pub const RISK_WEIGHT_UPTIME: f64 = 0.2;
pub const RISK_WEIGHT_GEOGRAPHY: f64 = 0.15;
pub const RISK_WEIGHT_COST: f64 = 0.1;

/// Term value used when geography or cost data is missing
pub const RISK_MISSING_DATA_TERM: f64 = 0.1;

/// Failure probability reported for providers without metrics
pub const UNKNOWN_FAILURE_PROBABILITY: f64 = 0.1;

/// Bounded per-provider failure log
pub const FAILURE_LOG_CAPACITY: usize = 1000;

/// Risk factor reinforcement per failure event
pub const RISK_FACTOR_INCREMENT: f64 = 0.1;

/// Learned risk factors at or above this weight are reported
pub const LEARNED_RISK_FACTOR_THRESHOLD: f64 = 0.5;

/// Failure events needed before confidence can rise above the floor
pub const CONFIDENCE_MIN_EVENTS: usize = 5;

/// Confidence floor
pub const CONFIDENCE_FLOOR: f64 = 0.1;

/// Risk factor thresholds
pub const RISK_FACTOR_RESPONSE_TIME_MS: f64 = 1000.0;
pub const RISK_FACTOR_ERROR_RATE: f64 = 0.05;
pub const RISK_FACTOR_UPTIME_PERCENT: f64 = 99.0;
pub const RISK_FACTOR_NETWORK_LATENCY_MS: f64 = 200.0;
pub const RISK_FACTOR_COST_PER_OP: f64 = 0.5;
pub const RISK_FACTOR_THROUGHPUT_RPS: f64 = 10.0;

// ============================================================================
// SUBSCRIPTION
// ============================================================================

pub const DEFAULT_MAX_REPLICATIONS_PER_MONTH: u64 = 100;
pub const DEFAULT_MAX_FAILOVERS_PER_MONTH: u64 = 100;
pub const DEFAULT_MAX_STORAGE_GB: u64 = 1;
