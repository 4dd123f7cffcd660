//! Per-type document manifests.
//!
//! A manifest is the schema record for one document type: its template
//! source, ID pattern, required structure, and validation rules. Manifests
//! are data, not code; validation and templating dispatch generically over
//! the loaded record.

mod builtin;
mod loader;
mod types;

pub use loader::ManifestLoader;
pub use types::{
    Manifest, OutputSpec, Rule, ScriptCheck, SectionSpec, Structure, TemplateSpec, ValidationSpec,
};
