//! # HyperDrive Router - Provider Implementations
//!
//! Holon providers that ship with the workspace. Each implements the
//! `HolonProvider` port defined in `hdr-domain`.
//!
//! | Provider | Feature | Use |
//! |----------|---------|-----|
//! | `InMemoryHolonProvider` | `memory` | Development, tests, CLI bootstrap |
//! | `NullHolonProvider` | `null` | Placeholder registrations |
//!
//! ## Usage
//!
//! ```ignore
//! use hdr_providers::InMemoryHolonProvider;
//! use hdr_domain::value_objects::ProviderType;
//!
//! let mongo = InMemoryHolonProvider::new(ProviderType::MongoDb);
//! ```

pub use hdr_domain::error::{Error, Result};
pub use hdr_domain::ports::HolonProvider;

/// In-memory holon store
#[cfg(feature = "memory")]
pub mod memory;

/// Null holon store
#[cfg(feature = "null")]
pub mod null;

#[cfg(feature = "memory")]
pub use memory::InMemoryHolonProvider;
#[cfg(feature = "null")]
pub use null::NullHolonProvider;
