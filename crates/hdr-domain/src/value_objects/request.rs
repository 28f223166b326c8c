//! Request classification used by routing and quota accounting

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of logical operation carried by a routing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    LoadHolon,
    LoadHolonsForParent,
    LoadHolonsByMetadata,
    SaveHolon,
}

/// Coarse access pattern of a request kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPattern {
    Read,
    Search,
    Write,
}

impl RequestKind {
    /// Every request kind
    pub const ALL: [Self; 4] = [
        Self::LoadHolon,
        Self::LoadHolonsForParent,
        Self::LoadHolonsByMetadata,
        Self::SaveHolon,
    ];

    /// Access pattern used for affinity lookups
    pub fn access(&self) -> AccessPattern {
        match self {
            Self::LoadHolon | Self::LoadHolonsForParent => AccessPattern::Read,
            Self::LoadHolonsByMetadata => AccessPattern::Search,
            Self::SaveHolon => AccessPattern::Write,
        }
    }

    /// Billing class the request counts against
    ///
    /// Writes are billed as replications because every save may fan out.
    pub fn operation_class(&self) -> OperationClass {
        match self {
            Self::SaveHolon => OperationClass::Replications,
            Self::LoadHolon | Self::LoadHolonsForParent | Self::LoadHolonsByMetadata => {
                OperationClass::Requests
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadHolon => "load_holon",
            Self::LoadHolonsForParent => "load_holons_for_parent",
            Self::LoadHolonsByMetadata => "load_holons_by_metadata",
            Self::SaveHolon => "save_holon",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation class a subscription plan meters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationClass {
    Requests,
    Replications,
    Failovers,
    Storage,
}

impl OperationClass {
    pub const ALL: [Self; 4] = [
        Self::Requests,
        Self::Replications,
        Self::Failovers,
        Self::Storage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requests => "requests",
            Self::Replications => "replications",
            Self::Failovers => "failovers",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for OperationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
