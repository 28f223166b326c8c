//! # HyperDrive Router - Infrastructure Layer
//!
//! Routing core, configuration, logging and service bootstrap.
//!
//! | Module | Contents |
//! |--------|----------|
//! | `routing` | Registry, scoring stack, quota guard and the router |
//! | `holons` | Failover read path and replicated saves |
//! | `di` | Composition root |
//! | `config` | Layered configuration (defaults, TOML, `HDR_` env) |
//! | `logging` | `tracing` subscriber setup |
//! | `error_ext` | Context helpers for foreign errors |

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod holons;
pub mod logging;
pub mod routing;

pub use config::{AppConfig, ConfigLoader};
pub use di::{AppContext, init_app};
pub use error_ext::ErrorContext;
pub use holons::{HolonManager, LoadOptions};
pub use routing::{HyperDriveRouter, RoutingRequest};
