//! Null holon provider
//!
//! Stores nothing. Loads report "not found", saves echo the input.

use async_trait::async_trait;
use hdr_domain::entities::{Holon, HolonFilter, HolonKey, MetadataQuery};
use hdr_domain::error::{Error, Result};
use hdr_domain::ports::HolonProvider;
use hdr_domain::value_objects::{Outcome, ProviderType};

/// Provider that never holds data
#[derive(Debug, Clone, Copy)]
pub struct NullHolonProvider {
    provider_type: ProviderType,
}

impl NullHolonProvider {
    /// Create a null provider answering as `provider_type`
    pub fn new(provider_type: ProviderType) -> Self {
        Self { provider_type }
    }
}

#[async_trait]
impl HolonProvider for NullHolonProvider {
    fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    fn is_active(&self) -> bool {
        true
    }

    async fn activate(&self) -> Result<bool> {
        Ok(true)
    }

    async fn deactivate(&self) -> Result<bool> {
        Ok(true)
    }

    async fn load_holon(&self, key: &HolonKey) -> Result<Outcome<Holon>> {
        Err(Error::not_found(format!("holon {key}")))
    }

    async fn load_holons_for_parent(
        &self,
        _parent: &HolonKey,
        _filter: &HolonFilter,
    ) -> Result<Outcome<Vec<Holon>>> {
        Ok(Outcome::ok(Vec::new()))
    }

    async fn load_holons_by_metadata(&self, _query: &MetadataQuery) -> Result<Outcome<Vec<Holon>>> {
        Ok(Outcome::ok(Vec::new()))
    }

    async fn save_holon(&self, holon: &Holon) -> Result<Outcome<Holon>> {
        Ok(Outcome::ok(holon.clone()))
    }
}
