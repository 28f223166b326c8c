//! Error handling types

use crate::value_objects::{OperationClass, ProviderCategory, ProviderType};
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the HyperDrive router
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (simple form)
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// I/O operation error (with context)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A single provider call failed
    #[error("Provider {provider} failed: {message}")]
    Provider {
        /// Provider that reported the failure
        provider: ProviderType,
        /// Description of the failure
        message: String,
    },

    /// A single provider call exceeded its time budget
    #[error("Provider {provider} timed out after {seconds}s")]
    Timeout {
        /// Provider that timed out
        provider: ProviderType,
        /// Timeout that was exceeded
        seconds: u64,
    },

    /// Subscription limit reached for an operation class
    #[error("Quota exceeded for {class}: usage {usage} has reached the limit of {limit}")]
    QuotaExceeded {
        /// Operation class whose limit was hit
        class: OperationClass,
        /// Usage recorded so far in the billing period
        usage: u64,
        /// Configured limit for the plan
        limit: u64,
    },

    /// No provider is eligible to serve a request
    #[error("No eligible {category} provider: {reason}")]
    NoEligibleProvider {
        /// Capability category that was searched
        category: ProviderCategory,
        /// Why the candidate set was empty
        reason: String,
    },

    /// Every candidate provider failed
    #[error(
        "All providers failed for {operation}; attempted [{}]: {last_message}",
        join_providers(.attempted)
    )]
    AllProvidersFailed {
        /// Logical operation that was attempted
        operation: String,
        /// Providers tried, in attempt order
        attempted: Vec<ProviderType>,
        /// Message of the last underlying failure
        last_message: String,
    },

    /// Parent loaded but its children could not be loaded consistently
    #[error("Holon {parent} loaded without its children: {message}")]
    PartialLoad {
        /// Identifier of the parent holon
        parent: String,
        /// Description of the child failures
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },

    /// Infrastructure operation error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

fn join_providers(providers: &[ProviderType]) -> String {
    providers
        .iter()
        .map(ProviderType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// Basic error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }
}

// I/O error creation methods
impl Error {
    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Routing error creation methods
impl Error {
    /// Create a provider failure
    pub fn provider<S: Into<String>>(provider: ProviderType, message: S) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }

    /// Create a provider timeout
    pub fn timeout(provider: ProviderType, seconds: u64) -> Self {
        Self::Timeout { provider, seconds }
    }

    /// Create a quota violation
    pub fn quota_exceeded(class: OperationClass, usage: u64, limit: u64) -> Self {
        Self::QuotaExceeded {
            class,
            usage,
            limit,
        }
    }

    /// Create a selection failure
    pub fn no_eligible_provider<S: Into<String>>(category: ProviderCategory, reason: S) -> Self {
        Self::NoEligibleProvider {
            category,
            reason: reason.into(),
        }
    }

    /// Create an aggregate exhaustion error
    pub fn all_providers_failed<O: Into<String>, S: Into<String>>(
        operation: O,
        attempted: Vec<ProviderType>,
        last_message: S,
    ) -> Self {
        Self::AllProvidersFailed {
            operation: operation.into(),
            attempted,
            last_message: last_message.into(),
        }
    }

    /// Create a partial child load failure
    pub fn partial_load<P: Into<String>, S: Into<String>>(parent: P, message: S) -> Self {
        Self::PartialLoad {
            parent: parent.into(),
            message: message.into(),
        }
    }
}

// Classification
impl Error {
    /// Whether the failure belongs to a single provider attempt and should
    /// move the request on to the next failover candidate.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. }
                | Self::Timeout { .. }
                | Self::NotFound { .. }
                | Self::Io { .. }
                | Self::IoSimple { .. }
        )
    }

    /// Whether the caller can act on the error without operator help
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded { .. } | Self::InvalidArgument { .. }
        )
    }
}
