//! Composition root
//!
//! Builds the long-lived routing services once per process and hands out
//! shared handles to them.

pub mod bootstrap;

pub use bootstrap::{AppContext, init_app, init_app_with_usage};
