//! Configuration loader
//!
//! Handles loading configuration from TOML files, environment variables,
//! and default values using Figment.

use crate::config::{
    AppConfig, OptimizationConfig, PredictionConfig, RoutingConfig, ScoringConfig,
};
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
    MAX_PROVIDER_CALL_TIMEOUT_SECS,
};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use hdr_domain::error::{Error, Result};
use hdr_domain::value_objects::ProviderType;
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

/// Tolerance when checking that a weight set sums to one
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    #[must_use]
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// Sources are merged in this order (later sources override earlier):
    /// 1. Default values from `AppConfig::default()`
    /// 2. TOML configuration file (if exists)
    /// 3. Environment variables with prefix (e.g. `HDR_ROUTING__PROVIDER_CALL_TIMEOUT_SECS`)
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                log_config_loaded(config_path, true);
            } else {
                log_config_loaded(config_path, false);
            }
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            log_config_loaded(&default_path, true);
        }

        // Double underscore separates nested keys so field names keep their underscores
        figment = figment
            .merge(Env::prefixed(&format!("{}_", self.env_prefix)).split(CONFIG_ENV_SEPARATOR));

        let app_config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&app_config)?;

        Ok(app_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).io_context("Failed to write config file")?;

        Ok(())
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let mut candidates = vec![
            current_dir.join(DEFAULT_CONFIG_FILENAME),
            current_dir
                .join(DEFAULT_CONFIG_DIR)
                .join(DEFAULT_CONFIG_FILENAME),
        ];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME));
        }

        candidates.into_iter().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate application configuration
///
/// Performs validation of every configuration section.
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    parse_log_level(&config.logging.level)?;
    validate_routing_config(&config.routing)?;
    validate_scoring_config(&config.scoring)?;
    validate_optimization_config(&config.optimization)?;
    validate_prediction_config(&config.prediction)?;
    Ok(())
}

fn validate_routing_config(config: &RoutingConfig) -> Result<()> {
    if config.provider_call_timeout_secs == 0
        || config.provider_call_timeout_secs > MAX_PROVIDER_CALL_TIMEOUT_SECS
    {
        return Err(Error::configuration(format!(
            "routing.provider_call_timeout_secs must be between 1 and {MAX_PROVIDER_CALL_TIMEOUT_SECS}"
        )));
    }
    validate_provider_list("auto_failover_providers", &config.auto_failover_providers)?;
    validate_provider_list("auto_replication_providers", &config.auto_replication_providers)?;
    validate_provider_list(
        "auto_load_balance_providers",
        &config.auto_load_balance_providers,
    )?;
    Ok(())
}

fn validate_provider_list(name: &str, providers: &[ProviderType]) -> Result<()> {
    let mut seen = HashSet::new();
    for provider in providers {
        if provider.is_default() {
            return Err(Error::configuration(format!(
                "routing.{name} cannot contain Default"
            )));
        }
        if !seen.insert(provider) {
            return Err(Error::configuration(format!(
                "routing.{name} lists {provider} more than once"
            )));
        }
    }
    Ok(())
}

fn validate_scoring_config(config: &ScoringConfig) -> Result<()> {
    validate_weights(
        "scoring composite",
        &[
            config.performance_weight,
            config.cost_weight,
            config.availability_weight,
        ],
    )?;
    validate_weights(
        "scoring performance",
        &[
            config.latency_weight,
            config.throughput_weight,
            config.error_weight,
        ],
    )?;
    validate_weights(
        "scoring weighted",
        &[
            config.weighted.performance,
            config.weighted.cost,
            config.weighted.geography,
            config.weighted.availability,
        ],
    )?;
    validate_weights(
        "scoring geography",
        &[config.geo_latency_weight, config.geo_hops_weight],
    )?;
    if !(0.0..=100.0).contains(&config.neutral_score) {
        return Err(Error::configuration(
            "scoring.neutral_score must be between 0 and 100",
        ));
    }
    if config.throughput_window_secs == 0 {
        return Err(Error::configuration(
            "scoring.throughput_window_secs must be positive",
        ));
    }
    validate_positive("scoring.latency_ms_per_point", config.latency_ms_per_point)?;
    Ok(())
}

fn validate_optimization_config(config: &OptimizationConfig) -> Result<()> {
    validate_weights(
        "optimization factor",
        &[
            config.history_weight,
            config.affinity_weight,
            config.load_weight,
            config.cost_weight,
        ],
    )?;
    if !(0.0..=0.5).contains(&config.jitter) {
        return Err(Error::configuration(
            "optimization.jitter must be between 0.0 and 0.5",
        ));
    }
    if config.history_retention_days <= 0 || config.recent_window_hours <= 0 {
        return Err(Error::configuration(
            "optimization retention windows must be positive",
        ));
    }
    if config.recent_window_hours > config.history_retention_days * 24 {
        return Err(Error::configuration(
            "optimization.recent_window_hours cannot exceed the retention window",
        ));
    }
    if config.load_ceiling == 0 || config.recommendation_limit == 0 {
        return Err(Error::configuration(
            "optimization.load_ceiling and recommendation_limit must be positive",
        ));
    }
    validate_positive(
        "optimization.latency_reference_ms",
        config.latency_reference_ms,
    )?;
    Ok(())
}

fn validate_prediction_config(config: &PredictionConfig) -> Result<()> {
    validate_weights(
        "prediction",
        &[
            config.response_time_weight,
            config.error_rate_weight,
            config.uptime_weight,
            config.geography_weight,
            config.cost_weight,
        ],
    )?;
    validate_positive(
        "prediction.response_time_ceiling_ms",
        config.response_time_ceiling_ms,
    )?;
    validate_positive(
        "prediction.network_latency_ceiling_ms",
        config.network_latency_ceiling_ms,
    )?;
    validate_positive("prediction.cost_ceiling", config.cost_ceiling)?;
    if config.failure_log_capacity == 0 {
        return Err(Error::configuration(
            "prediction.failure_log_capacity must be positive",
        ));
    }
    if !(0.0..=1.0).contains(&config.risk_factor_increment) {
        return Err(Error::configuration(
            "prediction.risk_factor_increment must be between 0.0 and 1.0",
        ));
    }
    Ok(())
}

fn validate_weights(name: &str, weights: &[f64]) -> Result<()> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(Error::configuration(format!(
            "{name} weights must be finite and non-negative"
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(Error::configuration(format!(
            "{name} weights must sum to 1.0 (got {sum})"
        )));
    }
    Ok(())
}

fn validate_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::configuration(format!("{name} must be positive")))
    }
}
