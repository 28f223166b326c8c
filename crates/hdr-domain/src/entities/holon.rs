//! Holon entity, lookup keys and change tracking snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::value_objects::ProviderType;

/// Kind of a holon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HolonType {
    #[default]
    Holon,
    Zome,
    Avatar,
    Quest,
    Mission,
    InventoryItem,
    Park,
    Building,
}

impl FromStr for HolonType {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.trim().to_ascii_lowercase().as_str() {
            "holon" => Self::Holon,
            "zome" => Self::Zome,
            "avatar" => Self::Avatar,
            "quest" => Self::Quest,
            "mission" => Self::Mission,
            "inventoryitem" | "inventory_item" => Self::InventoryItem,
            "park" => Self::Park,
            "building" => Self::Building,
            _ => {
                return Err(crate::error::Error::invalid_argument(format!(
                    "Unknown holon type: {s}"
                )));
            }
        };
        Ok(ty)
    }
}

/// Generic persisted entity loaded and saved through providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holon {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub holon_type: HolonType,
    pub parent_id: Option<Uuid>,
    /// Native key of this holon in each provider that stores it
    pub provider_keys: BTreeMap<ProviderType, String>,
    /// Raw key/value metadata as stored by the provider
    pub metadata: BTreeMap<String, String>,
    pub version: u32,
    pub is_active: bool,
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub children: Vec<Holon>,
}

impl Holon {
    /// Create an empty holon with a fresh identifier
    pub fn new<S: Into<String>>(name: S, holon_type: HolonType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            holon_type,
            parent_id: None,
            provider_keys: BTreeMap::new(),
            metadata: BTreeMap::new(),
            version: 1,
            is_active: true,
            modified_at: Utc::now(),
            children: Vec::new(),
        }
    }

    /// Attach this holon under a parent
    #[must_use]
    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Add a raw metadata entry
    #[must_use]
    pub fn with_metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether the holon is addressed by the given key
    pub fn matches_key(&self, key: &HolonKey) -> bool {
        match key {
            HolonKey::Id(id) => self.id == *id,
            HolonKey::ProviderKey(k) => self.provider_keys.values().any(|v| v == k),
        }
    }

    /// Copy well-known metadata entries into typed fields.
    ///
    /// Only fills fields that are still unset, so explicit values win over
    /// metadata. Returns the number of fields mapped.
    pub fn map_metadata(&mut self) -> usize {
        let mut mapped = 0;
        if self.name.is_empty()
            && let Some(name) = self.metadata.get("name")
        {
            self.name.clone_from(name);
            mapped += 1;
        }
        if self.description.is_empty()
            && let Some(description) = self.metadata.get("description")
        {
            self.description.clone_from(description);
            mapped += 1;
        }
        if self.parent_id.is_none()
            && let Some(parent) = self.metadata.get("parent_id").and_then(|v| v.parse().ok())
        {
            self.parent_id = Some(parent);
            mapped += 1;
        }
        if self.holon_type == HolonType::Holon
            && let Some(ty) = self.metadata.get("holon_type").and_then(|v| v.parse().ok())
        {
            self.holon_type = ty;
            mapped += 1;
        }
        mapped
    }

    /// Total number of descendants currently attached
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

/// Address of a holon: its global id or a provider-native key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HolonKey {
    Id(Uuid),
    ProviderKey(String),
}

impl fmt::Display for HolonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::ProviderKey(key) => write!(f, "key:{key}"),
        }
    }
}

impl From<Uuid> for HolonKey {
    fn from(id: Uuid) -> Self {
        Self::Id(id)
    }
}

/// Filter applied when loading the children of a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HolonFilter {
    /// Restrict to one holon type; `None` loads every type
    pub holon_type: Option<HolonType>,
}

impl HolonFilter {
    pub fn accepts(&self, holon: &Holon) -> bool {
        self.holon_type.is_none_or(|ty| ty == holon.holon_type)
    }
}

/// How metadata pairs combine in a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataMatchMode {
    #[default]
    All,
    Any,
}

/// Metadata lookup: one or more key/value pairs and a match mode
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetadataQuery {
    pub pairs: BTreeMap<String, String>,
    pub match_mode: MetadataMatchMode,
}

impl MetadataQuery {
    /// Query for a single key/value pair
    pub fn single<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        let mut pairs = BTreeMap::new();
        pairs.insert(key.into(), value.into());
        Self {
            pairs,
            match_mode: MetadataMatchMode::All,
        }
    }

    pub fn matches(&self, holon: &Holon) -> bool {
        let mut hits = self
            .pairs
            .iter()
            .map(|(k, v)| holon.metadata.get(k) == Some(v));
        match self.match_mode {
            MetadataMatchMode::All => hits.all(|hit| hit),
            MetadataMatchMode::Any => hits.any(|hit| hit),
        }
    }
}

/// Immutable as-loaded copy of a holon, kept for change tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolonSnapshot {
    holon: Holon,
    taken_at: DateTime<Utc>,
}

impl HolonSnapshot {
    /// Take a deep copy of the holon's own fields; children are not captured
    pub fn capture(holon: &Holon) -> Self {
        let mut copy = holon.clone();
        copy.children.clear();
        Self {
            holon: copy,
            taken_at: Utc::now(),
        }
    }

    pub fn holon(&self) -> &Holon {
        &self.holon
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}

/// A holon as returned by the read path, with its as-loaded baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedHolon {
    pub holon: Holon,
    pub original: HolonSnapshot,
    /// Provider that served the load
    pub provider: ProviderType,
}

impl LoadedHolon {
    pub fn new(holon: Holon, provider: ProviderType) -> Self {
        let original = HolonSnapshot::capture(&holon);
        Self {
            holon,
            original,
            provider,
        }
    }

    /// Names of the fields that differ from the as-loaded baseline
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let (now, then) = (&self.holon, self.original.holon());
        let mut changed = Vec::new();
        if now.name != then.name {
            changed.push("name");
        }
        if now.description != then.description {
            changed.push("description");
        }
        if now.holon_type != then.holon_type {
            changed.push("holon_type");
        }
        if now.parent_id != then.parent_id {
            changed.push("parent_id");
        }
        if now.provider_keys != then.provider_keys {
            changed.push("provider_keys");
        }
        if now.metadata != then.metadata {
            changed.push("metadata");
        }
        if now.version != then.version {
            changed.push("version");
        }
        if now.is_active != then.is_active {
            changed.push("is_active");
        }
        changed
    }

    pub fn is_dirty(&self) -> bool {
        !self.changed_fields().is_empty()
    }
}
