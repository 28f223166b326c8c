//! Domain layer constants
//!
//! Provider classifications used by plan-aware routing. Infrastructure
//! tuning knobs live in `hdr_infrastructure::constants`.

use crate::value_objects::ProviderType;

// ============================================================================
// PROVIDER CLASSIFICATION
// ============================================================================

/// Providers that cost nothing to operate, the only ones a free plan may use
pub const FREE_PROVIDERS: [ProviderType; 9] = [
    ProviderType::MongoDb,
    ProviderType::Ipfs,
    ProviderType::Seeds,
    ProviderType::Scuttlebutt,
    ProviderType::ThreeFold,
    ProviderType::Holo,
    ProviderType::Plan,
    ProviderType::Solid,
    ProviderType::BlockStack,
];

/// Providers with per-transaction fees, excluded from basic plans
pub const HIGH_COST_PROVIDERS: [ProviderType; 3] = [
    ProviderType::Ethereum,
    ProviderType::Tron,
    ProviderType::ChainLink,
];

// ============================================================================
// SCORING
// ============================================================================

/// Score on the 0-100 scale given to providers with no observations
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Reputation a provider starts with
pub const NEUTRAL_REPUTATION: f64 = 0.5;
