//! Failure classification and risk tiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ProviderType;

/// Risk tier derived from a failure probability.
///
/// Ordering follows severity; `Unknown` sorts below every known tier so a
/// maximum across providers only reports it when nothing else is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Unknown,
    VeryLow,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Map a failure probability onto a tier
    pub fn from_probability(probability: f64) -> Self {
        match probability {
            p if p >= 0.8 => Self::Critical,
            p if p >= 0.6 => Self::High,
            p if p >= 0.4 => Self::Medium,
            p if p >= 0.2 => Self::Low,
            _ => Self::VeryLow,
        }
    }

    /// Tiers that trigger a preventive failover
    pub fn requires_action(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::VeryLow => "very_low",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// Category of an observed provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureType {
    Timeout,
    ConnectionError,
    AuthenticationError,
    RateLimitExceeded,
    ServiceUnavailable,
    DataCorruption,
    PerformanceDegradation,
    SecurityBreach,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single observed failure, as fed to the prediction model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEvent {
    pub provider: ProviderType,
    pub failure_type: FailureType,
    /// Short machine-friendly cause, part of the risk-factor key
    pub cause: String,
    /// Severity in `[0, 1]`
    pub severity: f64,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

impl FailureEvent {
    /// Create an event stamped with the current time
    pub fn new<C: Into<String>, M: Into<String>>(
        provider: ProviderType,
        failure_type: FailureType,
        cause: C,
        message: M,
    ) -> Self {
        Self {
            provider,
            failure_type,
            cause: cause.into(),
            severity: 0.5,
            message: message.into(),
            occurred_at: Utc::now(),
        }
    }

    /// Override the severity, clamped to `[0, 1]`
    #[must_use]
    pub fn with_severity(mut self, severity: f64) -> Self {
        self.severity = severity.clamp(0.0, 1.0);
        self
    }

    /// Override the timestamp
    #[must_use]
    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }

    /// Key of the risk factor this event reinforces
    pub fn risk_factor_key(&self) -> String {
        format!("{}_{}", self.failure_type, self.cause)
    }
}
