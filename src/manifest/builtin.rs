//! Built-in manifests for the stock document types.
//!
//! Project manifests under `.docman/manifests/` shadow these.

pub const BUILTIN_TYPES: &[&str] = &["plan", "spec", "investigation"];

#[must_use]
pub fn builtin_manifest(doc_type: &str) -> Option<&'static str> {
    match doc_type {
        "plan" => Some(PLAN),
        "spec" => Some(SPEC),
        "investigation" => Some(INVESTIGATION),
        _ => None,
    }
}

const PLAN: &str = r#"
name: Plan
version: "1.0"
doc_type: plan
id_pattern: "P-{num}"
id_sequence_key: plan
structure:
  required_sections:
    - Overview
    - name: Steps
      contains: ["- [ ]", "- [x]"]
    - Risks
  optional_sections:
    - Rollback
    - Open Questions
validation:
  rules:
    - id: has-status
      pattern: "(?m)^Status:"
      severity: warning
      message: "plan should declare a Status line"
      suggestion: "add 'Status: draft' near the top"
output:
  default_path: docs/plans
  naming: "{id}-{name}.md"
"#;

const SPEC: &str = r#"
name: Spec
version: "1.0"
doc_type: spec
id_pattern: "S-{num}"
id_sequence_key: spec
structure:
  required_sections:
    - Overview
    - Requirements
    - name: Acceptance Criteria
      contains: ["- "]
  optional_sections:
    - Non-goals
validation:
  rules:
    - id: has-owner
      pattern: "(?mi)^owner:"
      severity: warning
      message: "spec should name an owner"
      suggestion: "add an 'Owner:' line near the top"
output:
  default_path: docs/specs
  naming: "{id}-{name}.md"
"#;

const INVESTIGATION: &str = r#"
name: Investigation
version: "1.0"
doc_type: investigation
id_pattern: "INV-{num}"
id_sequence_key: investigation
structure:
  required_sections:
    - Summary
    - Findings
    - name: Next Steps
      contains: ["- "]
output:
  default_path: docs/investigations
  naming: "{id}-{name}.md"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;

    #[test]
    fn test_all_builtins_parse() {
        for doc_type in BUILTIN_TYPES {
            let raw = builtin_manifest(doc_type).unwrap();
            let manifest: Manifest = serde_yaml::from_str(raw).unwrap();
            assert_eq!(&manifest.doc_type, doc_type);
            assert!(manifest.id_pattern.is_some());
        }
    }

    #[test]
    fn test_unknown_type_has_no_builtin() {
        assert!(builtin_manifest("memo").is_none());
    }
}
