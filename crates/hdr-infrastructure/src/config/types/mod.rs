//! Configuration types module

pub mod app;
pub mod logging;
pub mod optimization;
pub mod prediction;
pub mod routing;
pub mod scoring;
pub mod subscription;

// Re-export main types
pub use app::*;
