//! Registry persistence and ID sequencing.
//!
//! The registry is a single JSON file per project mapping document paths to
//! their lifecycle metadata, plus per-type ID counters. The store is the
//! only code that touches this file.

pub mod sequence;
pub mod store;

pub use sequence::format_id;
pub use store::{DocStatus, Registry, RegistryEntry, RegistryStats, RegistryStore};
