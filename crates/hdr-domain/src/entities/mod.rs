//! Domain entities

pub mod holon;

pub use holon::{
    Holon, HolonFilter, HolonKey, HolonSnapshot, HolonType, LoadedHolon, MetadataMatchMode,
    MetadataQuery,
};
