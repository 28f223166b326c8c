//! External provider ports

pub mod holon;

pub use holon::HolonProvider;
