//! Schema-driven document validation.
//!
//! The engine evaluates a manifest's required sections, pattern rules, and
//! external check scripts against document content, producing ordered,
//! deterministic diagnostics. The fixer applies the one mechanical fix we
//! trust: inserting stubs for missing required sections.

pub mod diagnostic;
pub mod document;
pub mod engine;
pub mod fixer;

pub use diagnostic::{Diagnostic, Severity, ValidationResult};
pub use engine::ValidationEngine;
pub use fixer::{fix_missing_sections, FixOutcome};

/// Fixed rule id for required-section failures.
pub const MISSING_SECTION: &str = "missing-section";
