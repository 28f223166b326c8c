//! Value objects shared across the routing layers

pub mod outcome;
pub mod provider;
pub mod request;
pub mod risk;
pub mod strategy;

pub use outcome::Outcome;
pub use provider::{ProviderCategory, ProviderType};
pub use request::{AccessPattern, OperationClass, RequestKind};
pub use risk::{FailureEvent, FailureType, RiskLevel};
pub use strategy::{LoadBalancingStrategy, PlanType};
