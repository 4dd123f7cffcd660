//! Deterministic auto-fixes.
//!
//! The only transformation applied mechanically is inserting a stub for a
//! required section that is missing outright. Sections that exist but lack
//! expected content, and pattern rules, have no unambiguous fix and stay
//! reported.

use crate::manifest::Manifest;

use super::document::{find_section, parse_sections};

const SECTION_STUB_BODY: &str = "_TODO: fill in._";

/// Result of a fix pass. `dry_run` callers use `preview` without writing;
/// a real pass with the same inputs produces exactly this `content`.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    /// Document content after the fix.
    pub content: String,
    /// Names of sections that were inserted, in manifest order.
    pub inserted: Vec<String>,
}

impl FixOutcome {
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.inserted.is_empty()
    }

    /// Human-readable preview of the change.
    #[must_use]
    pub fn preview(&self) -> String {
        self.inserted
            .iter()
            .map(|name| format!("+ ## {name}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Append stubs for required sections whose headings are missing.
#[must_use]
pub fn fix_missing_sections(content: &str, manifest: &Manifest) -> FixOutcome {
    let sections = parse_sections(content);
    let missing: Vec<String> = manifest
        .structure
        .required_sections
        .iter()
        .filter(|spec| find_section(&sections, &spec.name).is_none())
        .map(|spec| spec.name.clone())
        .collect();

    if missing.is_empty() {
        return FixOutcome {
            content: content.to_string(),
            inserted: missing,
        };
    }

    let mut fixed = content.to_string();
    if !fixed.is_empty() && !fixed.ends_with('\n') {
        fixed.push('\n');
    }
    for name in &missing {
        fixed.push_str(&format!("\n## {name}\n\n{SECTION_STUB_BODY}\n"));
    }

    FixOutcome {
        content: fixed,
        inserted: missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::SectionSpec;

    fn manifest(required: &[&str]) -> Manifest {
        let mut m: Manifest = serde_yaml::from_str("name: Plan\ndoc_type: plan\n").unwrap();
        m.structure.required_sections =
            required.iter().map(|n| SectionSpec::named(*n)).collect();
        m
    }

    #[test]
    fn test_inserts_missing_sections_in_order() {
        let m = manifest(&["Overview", "Steps", "Risks"]);
        let outcome = fix_missing_sections("## Steps\n\n- [ ] one\n", &m);

        assert!(outcome.changed());
        assert_eq!(outcome.inserted, vec!["Overview", "Risks"]);
        assert!(outcome.content.contains("## Overview"));
        assert!(outcome.content.contains("## Risks"));
        // Existing content untouched.
        assert!(outcome.content.starts_with("## Steps"));
    }

    #[test]
    fn test_no_change_when_complete() {
        let m = manifest(&["Overview"]);
        let outcome = fix_missing_sections("## Overview\n\ndone\n", &m);
        assert!(!outcome.changed());
        assert_eq!(outcome.content, "## Overview\n\ndone\n");
    }

    #[test]
    fn test_fix_is_deterministic() {
        let m = manifest(&["Overview", "Risks"]);
        let first = fix_missing_sections("# T\n", &m);
        let second = fix_missing_sections("# T\n", &m);
        assert_eq!(first.content, second.content);
        assert_eq!(first.inserted, second.inserted);
    }

    #[test]
    fn test_fixed_document_validates_structurally() {
        let m = manifest(&["Overview", "Risks"]);
        let outcome = fix_missing_sections("# T\n", &m);
        let engine = crate::validate::ValidationEngine::new(".");
        let result = engine.validate(&outcome.content, &m, None).unwrap();
        assert!(result.valid);
    }

    #[test]
    fn test_preview_lists_insertions() {
        let m = manifest(&["Overview"]);
        let outcome = fix_missing_sections("", &m);
        assert_eq!(outcome.preview(), "+ ## Overview");
    }
}
