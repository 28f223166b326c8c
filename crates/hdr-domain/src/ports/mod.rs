//! Port traits implemented by outer layers

pub mod infrastructure;
pub mod providers;

pub use infrastructure::UsageTracker;
pub use providers::HolonProvider;
