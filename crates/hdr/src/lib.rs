//! # HyperDrive Router
//!
//! A multi-backend data-access router. Callers issue logical holon
//! operations; the router picks a provider per call, fails over along
//! operator-curated lists, fans saves out for replication, and feeds every
//! outcome back into its scoring and failure-prediction models.
//!
//! ## Example
//!
//! ```ignore
//! use hdr::infrastructure::{init_app, AppConfig, LoadOptions};
//! use hdr::providers::InMemoryHolonProvider;
//! use hdr::domain::value_objects::{ProviderCategory, ProviderType};
//!
//! let context = init_app(AppConfig::default())?;
//! context.router().register_provider(
//!     ProviderCategory::Storage,
//!     Arc::new(InMemoryHolonProvider::new(ProviderType::MongoDb)),
//! )?;
//! let loaded = context.holons().load_holon(key, &LoadOptions::default()).await?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Entities, value objects, provider ports and the error type
//! - `infrastructure` - Routing core, configuration, logging, bootstrap
//! - `providers` - In-memory and null holon providers
//! - `cli` - The `hdr` command line

pub mod cli;

/// Domain layer - entities, value objects and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use hdr_domain::*;
}

/// Infrastructure layer - routing services, config and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use hdr_infrastructure::*;
}

/// Provider implementations
pub mod providers {
    pub use hdr_providers::*;
}

// Re-export commonly used types at the crate root
pub use domain::{Error, Result};
pub use infrastructure::{AppConfig, AppContext, HyperDriveRouter, RoutingRequest, init_app};
