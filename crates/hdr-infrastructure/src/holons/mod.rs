//! Holon loading and saving on top of the router

pub mod manager;

pub use manager::{HolonManager, LoadOptions};
