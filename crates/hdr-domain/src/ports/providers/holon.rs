//! Holon provider port
//!
//! Capability interface every registered backend exposes to the router.
//! Each call returns the tri-state `Result<Outcome<T>>`.

use async_trait::async_trait;

use crate::entities::{Holon, HolonFilter, HolonKey, MetadataQuery};
use crate::error::Result;
use crate::value_objects::{Outcome, ProviderType};

/// Holon storage backend
///
/// # Example
///
/// ```ignore
/// let outcome = provider.load_holon(&HolonKey::Id(id)).await?;
/// if outcome.is_warning() {
///     tracing::warn!(warnings = ?outcome.warnings, "Loaded with warnings");
/// }
/// ```
#[async_trait]
pub trait HolonProvider: Send + Sync {
    /// Identity of this backend
    fn provider_type(&self) -> ProviderType;

    /// Whether the connection is currently open
    fn is_active(&self) -> bool;

    /// Open the connection
    async fn activate(&self) -> Result<bool>;

    /// Close the connection
    async fn deactivate(&self) -> Result<bool>;

    /// Load a single holon by id or provider key
    async fn load_holon(&self, key: &HolonKey) -> Result<Outcome<Holon>>;

    /// Load the direct children of a parent
    async fn load_holons_for_parent(
        &self,
        parent: &HolonKey,
        filter: &HolonFilter,
    ) -> Result<Outcome<Vec<Holon>>>;

    /// Load every holon whose metadata matches the query
    async fn load_holons_by_metadata(&self, query: &MetadataQuery) -> Result<Outcome<Vec<Holon>>>;

    /// Persist a holon, returning the stored version
    async fn save_holon(&self, holon: &Holon) -> Result<Outcome<Holon>>;
}
