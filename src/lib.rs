//! docman - registry-backed lifecycle manager for structured project
//! documents (plans, specs, investigations).
//!
//! The library is organized leaf-first: the registry store owns all
//! persisted state, manifests describe per-type structure and rules, the
//! template resolver produces new documents, the validation engine checks
//! existing ones, and the watch loop re-validates on file change.

pub mod app;
pub mod cli;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod template;
pub mod utils;
pub mod validate;
pub mod watch;

pub use error::{DocmanError, Result};
