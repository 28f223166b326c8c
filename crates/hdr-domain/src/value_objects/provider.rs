//! Provider identity and capability categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Stable tag identifying a backend integration.
///
/// `Default` is the distinguished value meaning "whatever is currently
/// selected for the category". Equality is by tag value only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum ProviderType {
    /// Use the current provider of the category
    #[default]
    #[serde(rename = "Default")]
    Default,
    #[serde(rename = "MongoDBOASIS")]
    MongoDb,
    #[serde(rename = "SQLLiteDBOASIS")]
    SqliteDb,
    #[serde(rename = "LocalFileOASIS")]
    LocalFile,
    #[serde(rename = "Neo4jOASIS")]
    Neo4j,
    #[serde(rename = "AzureCosmosDBOASIS")]
    AzureCosmosDb,
    #[serde(rename = "IPFSOASIS")]
    Ipfs,
    #[serde(rename = "PinataOASIS")]
    Pinata,
    #[serde(rename = "HoloOASIS")]
    Holo,
    #[serde(rename = "EthereumOASIS")]
    Ethereum,
    #[serde(rename = "TRONOASIS")]
    Tron,
    #[serde(rename = "ChainLinkOASIS")]
    ChainLink,
    #[serde(rename = "SolanaOASIS")]
    Solana,
    #[serde(rename = "PolygonOASIS")]
    Polygon,
    #[serde(rename = "ArbitrumOASIS")]
    Arbitrum,
    #[serde(rename = "EOSIOOASIS")]
    Eosio,
    #[serde(rename = "TelosOASIS")]
    Telos,
    #[serde(rename = "SEEDSOASIS")]
    Seeds,
    #[serde(rename = "ScuttlebuttOASIS")]
    Scuttlebutt,
    #[serde(rename = "ThreeFoldOASIS")]
    ThreeFold,
    #[serde(rename = "PLANOASIS")]
    Plan,
    #[serde(rename = "SOLIDOASIS")]
    Solid,
    #[serde(rename = "BlockStackOASIS")]
    BlockStack,
}

impl ProviderType {
    /// Every concrete provider, excluding `Default`
    pub const ALL: [Self; 22] = [
        Self::MongoDb,
        Self::SqliteDb,
        Self::LocalFile,
        Self::Neo4j,
        Self::AzureCosmosDb,
        Self::Ipfs,
        Self::Pinata,
        Self::Holo,
        Self::Ethereum,
        Self::Tron,
        Self::ChainLink,
        Self::Solana,
        Self::Polygon,
        Self::Arbitrum,
        Self::Eosio,
        Self::Telos,
        Self::Seeds,
        Self::Scuttlebutt,
        Self::ThreeFold,
        Self::Plan,
        Self::Solid,
        Self::BlockStack,
    ];

    /// Canonical identifier used in configuration and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::MongoDb => "MongoDBOASIS",
            Self::SqliteDb => "SQLLiteDBOASIS",
            Self::LocalFile => "LocalFileOASIS",
            Self::Neo4j => "Neo4jOASIS",
            Self::AzureCosmosDb => "AzureCosmosDBOASIS",
            Self::Ipfs => "IPFSOASIS",
            Self::Pinata => "PinataOASIS",
            Self::Holo => "HoloOASIS",
            Self::Ethereum => "EthereumOASIS",
            Self::Tron => "TRONOASIS",
            Self::ChainLink => "ChainLinkOASIS",
            Self::Solana => "SolanaOASIS",
            Self::Polygon => "PolygonOASIS",
            Self::Arbitrum => "ArbitrumOASIS",
            Self::Eosio => "EOSIOOASIS",
            Self::Telos => "TelosOASIS",
            Self::Seeds => "SEEDSOASIS",
            Self::Scuttlebutt => "ScuttlebuttOASIS",
            Self::ThreeFold => "ThreeFoldOASIS",
            Self::Plan => "PLANOASIS",
            Self::Solid => "SOLIDOASIS",
            Self::BlockStack => "BlockStackOASIS",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        let id = self.as_str();
        id.strip_suffix("OASIS").unwrap_or(id)
    }

    /// Whether this is the "use current" placeholder
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = Error;

    /// Accepts the canonical identifier or the short name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("default") || wanted.eq_ignore_ascii_case("none") {
            return Ok(Self::Default);
        }
        Self::ALL
            .into_iter()
            .find(|p| {
                p.as_str().eq_ignore_ascii_case(wanted) || p.name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| Error::invalid_argument(format!("Unknown provider type: {s}")))
    }
}

/// Capability category a provider is registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    Storage,
    Network,
    KeyManager,
    Search,
    Nft,
    Map,
}

impl ProviderCategory {
    /// All categories in registry order
    pub const ALL: [Self; 6] = [
        Self::Storage,
        Self::Network,
        Self::KeyManager,
        Self::Search,
        Self::Nft,
        Self::Map,
    ];

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Network => "network",
            Self::KeyManager => "key_manager",
            Self::Search => "search",
            Self::Nft => "nft",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
