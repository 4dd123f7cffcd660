//! Manifest data model.

use serde::{Deserialize, Serialize};

use crate::validate::diagnostic::Severity;

/// Schema record for one document type. Immutable for the duration of a
/// command invocation; re-read on each invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub doc_type: String,
    #[serde(default)]
    pub template: TemplateSpec,
    /// ID pattern with a `{num}` placeholder, e.g. `"P-{num}"`.
    #[serde(default)]
    pub id_pattern: Option<String>,
    /// Registry counter key; defaults to the doc type.
    #[serde(default)]
    pub id_sequence_key: Option<String>,
    #[serde(default)]
    pub structure: Structure,
    #[serde(default)]
    pub validation: ValidationSpec,
    #[serde(default)]
    pub output: OutputSpec,
}

impl Manifest {
    /// Sequence key used for `--auto-id`, falling back to the doc type.
    #[must_use]
    pub fn sequence_key(&self) -> &str {
        self.id_sequence_key.as_deref().unwrap_or(&self.doc_type)
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Where the base template comes from. `path` is relative to the project
/// root; `url` supports the `github:` shorthand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateSpec {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Structure {
    #[serde(default)]
    pub required_sections: Vec<SectionSpec>,
    #[serde(default)]
    pub optional_sections: Vec<String>,
}

/// A required section. Written either as a bare heading name or as a map
/// with a `contains` list of substrings the section body must include
/// (any one suffices).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SectionSpecDe")]
pub struct SectionSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<Vec<String>>,
}

impl SectionSpec {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contains: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SectionSpecDe {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        contains: Option<Vec<String>>,
    },
}

impl From<SectionSpecDe> for SectionSpec {
    fn from(de: SectionSpecDe) -> Self {
        match de {
            SectionSpecDe::Name(name) => Self {
                name,
                contains: None,
            },
            SectionSpecDe::Full { name, contains } => Self { name, contains },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSpec {
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub scripts: Vec<ScriptCheck>,
}

/// A named pattern check. The rule fires when `pattern` does not match the
/// document content. Rules without an explicit severity are warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    pub message: String,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub docs: Option<String>,
}

impl Rule {
    #[must_use]
    pub fn effective_severity(&self) -> Severity {
        self.severity.unwrap_or(Severity::Warning)
    }
}

/// An external check script, resolved relative to the project root and
/// invoked with the document path as its only argument. Treated as an
/// opaque validator: non-zero exit is an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptCheck {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSpec {
    #[serde(default)]
    pub default_path: Option<String>,
    /// Naming template for created files, e.g. `"{id}-{name}.md"`.
    #[serde(default)]
    pub naming: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_spec_shorthand() {
        let yaml = r"
required_sections:
  - Overview
  - name: Steps
    contains: ['- [ ]', '- [x]']
";
        let structure: Structure = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(structure.required_sections.len(), 2);
        assert_eq!(structure.required_sections[0].name, "Overview");
        assert!(structure.required_sections[0].contains.is_none());
        assert_eq!(
            structure.required_sections[1].contains.as_ref().unwrap().len(),
            2
        );
    }

    #[test]
    fn test_rule_default_severity_is_warning() {
        let yaml = r"
id: has-owner
pattern: 'Owner:'
message: document should name an owner
";
        let rule: Rule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.effective_severity(), Severity::Warning);
    }

    #[test]
    fn test_manifest_minimal() {
        let yaml = r"
name: Plan
doc_type: plan
";
        let manifest: Manifest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(manifest.doc_type, "plan");
        assert_eq!(manifest.version, "1.0");
        assert_eq!(manifest.sequence_key(), "plan");
        assert!(manifest.structure.required_sections.is_empty());
    }

    #[test]
    fn test_sequence_key_override() {
        let yaml = r"
name: Plan
doc_type: plan
id_sequence_key: planning
";
        let manifest: Manifest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(manifest.sequence_key(), "planning");
    }
}
