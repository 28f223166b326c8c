//! Provider registry
//!
//! Per-category provider instances, the operator-curated auto lists and the
//! process-wide current provider pointers. Pure bookkeeping: no method
//! blocks on I/O. The instance tables are copy-on-write so routing reads
//! never wait on an administrative write.

use arc_swap::ArcSwap;
use dashmap::DashMap;
use hdr_domain::error::{Error, Result};
use hdr_domain::ports::HolonProvider;
use hdr_domain::value_objects::{ProviderCategory, ProviderType};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info};

/// Shared handle to a live provider
pub type ProviderInstance = Arc<dyn HolonProvider>;

/// Operator-curated provider lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoList {
    Failover,
    LoadBalance,
    Replication,
}

impl fmt::Display for AutoList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Failover => "failover",
            Self::LoadBalance => "load_balance",
            Self::Replication => "replication",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Default)]
struct CategoryTable {
    /// Registration order is preserved; it is the tie-break order downstream
    instances: Vec<(ProviderType, ProviderInstance)>,
    failover: Vec<ProviderType>,
    load_balance: Vec<ProviderType>,
    replication: Vec<ProviderType>,
}

impl CategoryTable {
    fn list(&self, list: AutoList) -> &Vec<ProviderType> {
        match list {
            AutoList::Failover => &self.failover,
            AutoList::LoadBalance => &self.load_balance,
            AutoList::Replication => &self.replication,
        }
    }

    fn list_mut(&mut self, list: AutoList) -> &mut Vec<ProviderType> {
        match list {
            AutoList::Failover => &mut self.failover,
            AutoList::LoadBalance => &mut self.load_balance,
            AutoList::Replication => &mut self.replication,
        }
    }
}

type RegistryState = HashMap<ProviderCategory, CategoryTable>;

/// Serializable view of one category
#[derive(Debug, Clone, Serialize)]
pub struct CategorySnapshot {
    pub category: ProviderCategory,
    pub current: ProviderType,
    pub registered: Vec<ProviderType>,
    pub auto_failover: Vec<ProviderType>,
    pub auto_load_balance: Vec<ProviderType>,
    pub auto_replication: Vec<ProviderType>,
}

/// Registry of provider instances and routing lists
pub struct ProviderRegistry {
    state: ArcSwap<RegistryState>,
    current: DashMap<ProviderCategory, ProviderType>,
    /// Active per-call overrides, newest last
    overrides: DashMap<ProviderCategory, Vec<(u64, ProviderType)>>,
    next_pin: AtomicU64,
    auto_failover_enabled: AtomicBool,
    auto_replication_enabled: AtomicBool,
    auto_load_balance_enabled: AtomicBool,
}

impl ProviderRegistry {
    /// Create an empty registry with every auto feature enabled except replication
    pub fn new() -> Self {
        Self {
            state: ArcSwap::from_pointee(RegistryState::new()),
            current: DashMap::new(),
            overrides: DashMap::new(),
            next_pin: AtomicU64::new(0),
            auto_failover_enabled: AtomicBool::new(true),
            auto_replication_enabled: AtomicBool::new(false),
            auto_load_balance_enabled: AtomicBool::new(true),
        }
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    /// Store or overwrite the instance for `id` in `category`
    pub fn register(
        &self,
        category: ProviderCategory,
        id: ProviderType,
        instance: ProviderInstance,
    ) {
        if id.is_default() {
            debug!("Ignoring registration under the Default placeholder");
            return;
        }
        self.state.rcu(|state| {
            let mut next = RegistryState::clone(state);
            let table = next.entry(category).or_default();
            if let Some(slot) = table.instances.iter_mut().find(|(p, _)| *p == id) {
                slot.1 = Arc::clone(&instance);
            } else {
                table.instances.push((id, Arc::clone(&instance)));
            }
            next
        });
        info!(category = %category, provider = %id, "Provider registered");
    }

    /// Remove a provider; a current pointer at it falls back to `Default`
    pub fn unregister(&self, category: ProviderCategory, id: ProviderType) -> bool {
        let mut removed = false;
        self.state.rcu(|state| {
            let mut next = RegistryState::clone(state);
            removed = false;
            if let Some(table) = next.get_mut(&category) {
                let before = table.instances.len();
                table.instances.retain(|(p, _)| *p != id);
                removed = table.instances.len() != before;
            }
            next
        });
        if removed {
            self.current
                .remove_if(&category, |_, current| *current == id);
            info!(category = %category, provider = %id, "Provider unregistered");
        }
        removed
    }

    /// Look up a live instance
    pub fn get(&self, category: ProviderCategory, id: ProviderType) -> Result<ProviderInstance> {
        let id = if id.is_default() { self.effective(category) } else { id };
        self.state
            .load()
            .get(&category)
            .and_then(|t| t.instances.iter().find(|(p, _)| *p == id))
            .map(|(_, instance)| Arc::clone(instance))
            .ok_or_else(|| Error::not_found(format!("{category} provider {id}")))
    }

    /// Registered providers of one category, or of every category when `None`.
    ///
    /// The union is de-duplicated and keeps first-registration order.
    pub fn list_available(&self, category: Option<ProviderCategory>) -> Vec<ProviderType> {
        let state = self.state.load();
        let mut out: Vec<ProviderType> = Vec::new();
        let categories: &[ProviderCategory] = match category {
            Some(ref c) => std::slice::from_ref(c),
            None => &ProviderCategory::ALL,
        };
        for c in categories {
            if let Some(table) = state.get(c) {
                for (p, _) in &table.instances {
                    if !out.contains(p) {
                        out.push(*p);
                    }
                }
            }
        }
        out
    }

    /// Membership test in one category, or in any when `None`
    pub fn is_registered(&self, id: ProviderType, category: Option<ProviderCategory>) -> bool {
        let state = self.state.load();
        match category {
            Some(c) => state
                .get(&c)
                .is_some_and(|t| t.instances.iter().any(|(p, _)| *p == id)),
            None => state
                .values()
                .any(|t| t.instances.iter().any(|(p, _)| *p == id)),
        }
    }

    // ---------------------------------------------------------------------
    // Auto lists
    // ---------------------------------------------------------------------

    /// Current contents of an auto list
    pub fn list(&self, category: ProviderCategory, list: AutoList) -> Vec<ProviderType> {
        self.state
            .load()
            .get(&category)
            .map(|t| t.list(list).clone())
            .unwrap_or_default()
    }

    /// Replace an auto list; duplicates and `Default` are dropped, order kept
    pub fn set_list(&self, category: ProviderCategory, list: AutoList, providers: &[ProviderType]) {
        let mut cleaned: Vec<ProviderType> = Vec::with_capacity(providers.len());
        for p in providers {
            if !p.is_default() && !cleaned.contains(p) {
                cleaned.push(*p);
            }
        }
        self.state.rcu(|state| {
            let mut next = RegistryState::clone(state);
            next.entry(category)
                .or_default()
                .list_mut(list)
                .clone_from(&cleaned);
            next
        });
        debug!(category = %category, list = %list, providers = ?cleaned, "Auto list replaced");
    }

    /// Append a provider to an auto list; returns false if already listed
    pub fn add_to_list(
        &self,
        category: ProviderCategory,
        list: AutoList,
        id: ProviderType,
    ) -> bool {
        if id.is_default() {
            return false;
        }
        let mut added = false;
        self.state.rcu(|state| {
            let mut next = RegistryState::clone(state);
            let entries = next.entry(category).or_default().list_mut(list);
            added = !entries.contains(&id);
            if added {
                entries.push(id);
            }
            next
        });
        added
    }

    /// Remove a provider from an auto list; returns false if it was not listed
    pub fn remove_from_list(
        &self,
        category: ProviderCategory,
        list: AutoList,
        id: ProviderType,
    ) -> bool {
        let mut removed = false;
        self.state.rcu(|state| {
            let mut next = RegistryState::clone(state);
            let entries = next.entry(category).or_default().list_mut(list);
            let before = entries.len();
            entries.retain(|p| *p != id);
            removed = entries.len() != before;
            next
        });
        removed
    }

    pub fn set_auto_failover_list(&self, category: ProviderCategory, providers: &[ProviderType]) {
        self.set_list(category, AutoList::Failover, providers);
    }

    pub fn set_auto_replication_list(
        &self,
        category: ProviderCategory,
        providers: &[ProviderType],
    ) {
        self.set_list(category, AutoList::Replication, providers);
    }

    pub fn set_auto_load_balance_list(
        &self,
        category: ProviderCategory,
        providers: &[ProviderType],
    ) {
        self.set_list(category, AutoList::LoadBalance, providers);
    }

    // ---------------------------------------------------------------------
    // Feature flags
    // ---------------------------------------------------------------------

    pub fn is_enabled(&self, list: AutoList) -> bool {
        self.flag(list).load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, list: AutoList, enabled: bool) {
        self.flag(list).store(enabled, Ordering::SeqCst);
        info!(list = %list, enabled, "Auto feature toggled");
    }

    fn flag(&self, list: AutoList) -> &AtomicBool {
        match list {
            AutoList::Failover => &self.auto_failover_enabled,
            AutoList::LoadBalance => &self.auto_load_balance_enabled,
            AutoList::Replication => &self.auto_replication_enabled,
        }
    }

    // ---------------------------------------------------------------------
    // Current provider pointers
    // ---------------------------------------------------------------------

    /// Provider new requests of the category default to
    pub fn current(&self, category: ProviderCategory) -> ProviderType {
        self.current
            .get(&category)
            .map_or(ProviderType::Default, |p| *p)
    }

    /// Explicitly switch the current provider of a category
    pub fn switch_current(
        &self,
        category: ProviderCategory,
        id: ProviderType,
    ) -> Result<ProviderType> {
        if !id.is_default() && !self.is_registered(id, Some(category)) {
            return Err(Error::not_found(format!(
                "{category} provider {id} is not registered"
            )));
        }
        let previous = self.current.insert(category, id).unwrap_or_default();
        if previous != id {
            info!(category = %category, from = %previous, to = %id, "Current provider switched");
        }
        Ok(previous)
    }

    /// Provider a `Default` lookup resolves to right now: the innermost
    /// active pin, else the current pointer
    pub fn effective(&self, category: ProviderCategory) -> ProviderType {
        self.overrides
            .get(&category)
            .and_then(|pins| pins.last().map(|(_, p)| *p))
            .unwrap_or_else(|| self.current(category))
    }

    /// Pin execution of the category to `id` for the lifetime of the guard.
    ///
    /// The current pointer itself is never written, so it reads the same
    /// before and after any number of nested or interleaved pins.
    pub fn pin(&self, category: ProviderCategory, id: ProviderType) -> ProviderPin<'_> {
        let previous = self.effective(category);
        let token = self.next_pin.fetch_add(1, Ordering::Relaxed);
        if !id.is_default() {
            self.overrides.entry(category).or_default().push((token, id));
        }
        ProviderPin {
            registry: self,
            category,
            token,
            previous,
        }
    }

    fn release(&self, category: ProviderCategory, token: u64) {
        if let Some(mut pins) = self.overrides.get_mut(&category) {
            pins.retain(|(t, _)| *t != token);
        }
        self.overrides.remove_if(&category, |_, pins| pins.is_empty());
    }

    /// Serializable view of every populated category
    pub fn snapshot(&self) -> Vec<CategorySnapshot> {
        let state = self.state.load();
        ProviderCategory::ALL
            .iter()
            .filter_map(|c| {
                state.get(c).map(|t| CategorySnapshot {
                    category: *c,
                    current: self.current(*c),
                    registered: t.instances.iter().map(|(p, _)| *p).collect(),
                    auto_failover: t.failover.clone(),
                    auto_load_balance: t.load_balance.clone(),
                    auto_replication: t.replication.clone(),
                })
            })
            .collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped override of a current provider pointer
#[must_use = "the override ends as soon as the pin is dropped"]
pub struct ProviderPin<'a> {
    registry: &'a ProviderRegistry,
    category: ProviderCategory,
    token: u64,
    previous: ProviderType,
}

impl ProviderPin<'_> {
    /// Provider `Default` resolved to before the pin
    pub fn previous(&self) -> ProviderType {
        self.previous
    }
}

impl Drop for ProviderPin<'_> {
    fn drop(&mut self) {
        self.registry.release(self.category, self.token);
    }
}
