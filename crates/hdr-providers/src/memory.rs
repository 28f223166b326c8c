//! In-memory holon provider
//!
//! Keeps holons in a concurrent map. Data is lost on restart. An operator
//! outage switch and an artificial latency make it usable for exercising
//! failover and timeouts.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use hdr_domain::entities::{Holon, HolonFilter, HolonKey, MetadataQuery};
use hdr_domain::error::{Error, Result};
use hdr_domain::ports::HolonProvider;
use hdr_domain::value_objects::{Outcome, ProviderType};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// In-memory holon store
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone)]
pub struct InMemoryHolonProvider {
    provider_type: ProviderType,
    holons: Arc<DashMap<Uuid, Holon>>,
    active: Arc<AtomicBool>,
    available: Arc<AtomicBool>,
    latency_ms: Arc<AtomicU64>,
    calls: Arc<AtomicU64>,
}

impl InMemoryHolonProvider {
    /// Create an empty store answering as `provider_type`
    pub fn new(provider_type: ProviderType) -> Self {
        Self {
            provider_type,
            holons: Arc::new(DashMap::new()),
            active: Arc::new(AtomicBool::new(false)),
            available: Arc::new(AtomicBool::new(true)),
            latency_ms: Arc::new(AtomicU64::new(0)),
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Seed the store with holons, keyed by id
    #[must_use]
    pub fn with_holons<I: IntoIterator<Item = Holon>>(self, holons: I) -> Self {
        for holon in holons {
            self.insert(holon);
        }
        self
    }

    /// Store a holon directly, bypassing the provider interface
    pub fn insert(&self, mut holon: Holon) {
        holon
            .provider_keys
            .entry(self.provider_type)
            .or_insert_with(|| holon.id.to_string());
        self.holons.insert(holon.id, holon);
    }

    /// Simulate an outage (`false`) or recovery (`true`)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Delay every call by the given latency
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    /// Number of data calls served or refused so far
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.holons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holons.is_empty()
    }

    async fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::provider(self.provider_type, "provider unavailable"))
        }
    }

    fn find(&self, key: &HolonKey) -> Option<Holon> {
        match key {
            HolonKey::Id(id) => self.holons.get(id).map(|h| h.clone()),
            HolonKey::ProviderKey(_) => self
                .holons
                .iter()
                .find(|h| h.matches_key(key))
                .map(|h| h.clone()),
        }
    }
}

#[async_trait]
impl HolonProvider for InMemoryHolonProvider {
    fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    async fn activate(&self) -> Result<bool> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(Error::provider(self.provider_type, "cannot activate"));
        }
        self.active.store(true, Ordering::SeqCst);
        debug!(provider = %self.provider_type, "Provider activated");
        Ok(true)
    }

    async fn deactivate(&self) -> Result<bool> {
        self.active.store(false, Ordering::SeqCst);
        Ok(true)
    }

    async fn load_holon(&self, key: &HolonKey) -> Result<Outcome<Holon>> {
        self.enter().await?;
        self.find(key)
            .map(Outcome::ok)
            .ok_or_else(|| Error::not_found(format!("holon {key} in {}", self.provider_type)))
    }

    async fn load_holons_for_parent(
        &self,
        parent: &HolonKey,
        filter: &HolonFilter,
    ) -> Result<Outcome<Vec<Holon>>> {
        self.enter().await?;
        let parent_id = match parent {
            HolonKey::Id(id) => Some(*id),
            HolonKey::ProviderKey(_) => self.find(parent).map(|h| h.id),
        };
        let Some(parent_id) = parent_id else {
            return Ok(Outcome::ok(Vec::new()));
        };
        let mut children: Vec<Holon> = self
            .holons
            .iter()
            .filter(|h| h.parent_id == Some(parent_id) && filter.accepts(h))
            .map(|h| h.clone())
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Outcome::ok(children))
    }

    async fn load_holons_by_metadata(&self, query: &MetadataQuery) -> Result<Outcome<Vec<Holon>>> {
        self.enter().await?;
        let matches = self
            .holons
            .iter()
            .filter(|h| query.matches(h))
            .map(|h| h.clone())
            .collect();
        Ok(Outcome::ok(matches))
    }

    async fn save_holon(&self, holon: &Holon) -> Result<Outcome<Holon>> {
        self.enter().await?;
        let mut stored = holon.clone();
        stored.children.clear();
        stored.modified_at = Utc::now();
        if let Some(existing) = self.holons.get(&stored.id) {
            stored.version = existing.version + 1;
        }
        self.insert(stored.clone());
        let stored = self.find(&HolonKey::Id(stored.id)).unwrap_or(stored);
        Ok(Outcome::ok(stored))
    }
}
