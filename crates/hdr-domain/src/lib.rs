//! # HyperDrive Router - Domain Layer
//!
//! Entities, value objects and port traits for a multi-backend data-access
//! router. Nothing in this crate performs I/O.
//!
//! | Module | Contents |
//! |--------|----------|
//! | `entities` | `Holon`, lookup keys, as-loaded snapshots |
//! | `value_objects` | Provider identity, request kinds, strategies, risk tiers, `Outcome` |
//! | `ports` | `HolonProvider` capability interface, `UsageTracker` |
//! | `error` | Domain error type |

pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
