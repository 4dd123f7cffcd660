//! The validation engine.

use std::path::{Path, PathBuf};
use std::process::Command;

use regex::Regex;
use tracing::debug;

use crate::error::{DocmanError, Result};
use crate::manifest::Manifest;

use super::diagnostic::{Diagnostic, ValidationResult};
use super::document::{find_section, parse_sections};
use super::MISSING_SECTION;

/// Runs a manifest's checks against document content.
///
/// Stateless apart from the project root, which is only used to resolve
/// check scripts. For a fixed document and manifest the result is
/// identical on repeated calls: sections, then rules, then scripts, each
/// in manifest order.
pub struct ValidationEngine {
    project_root: PathBuf,
}

impl ValidationEngine {
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Validate document content against a manifest. `doc_path` is handed
    /// to check scripts; when absent, script checks are skipped.
    pub fn validate(
        &self,
        content: &str,
        manifest: &Manifest,
        doc_path: Option<&Path>,
    ) -> Result<ValidationResult> {
        let mut diagnostics = Vec::new();

        self.check_sections(content, manifest, &mut diagnostics);
        self.check_rules(content, manifest, &mut diagnostics)?;
        if let Some(path) = doc_path {
            self.check_scripts(path, manifest, &mut diagnostics);
        }

        debug!(
            doc_type = %manifest.doc_type,
            diagnostics = diagnostics.len(),
            "validation complete"
        );
        Ok(ValidationResult::from_diagnostics(diagnostics))
    }

    fn check_sections(&self, content: &str, manifest: &Manifest, out: &mut Vec<Diagnostic>) {
        let sections = parse_sections(content);
        for spec in &manifest.structure.required_sections {
            match find_section(&sections, &spec.name) {
                None => {
                    out.push(
                        Diagnostic::error(
                            MISSING_SECTION,
                            format!("missing required section '{}'", spec.name),
                        )
                        .with_suggestion(format!("add a '## {}' heading", spec.name)),
                    );
                }
                Some(section) => {
                    if let Some(needles) = &spec.contains {
                        let found = needles.iter().any(|n| section.body.contains(n));
                        if !needles.is_empty() && !found {
                            out.push(
                                Diagnostic::error(
                                    MISSING_SECTION,
                                    format!(
                                        "section '{}' lacks expected content ({})",
                                        spec.name,
                                        needles.join(", ")
                                    ),
                                )
                                .with_suggestion(format!(
                                    "include one of: {}",
                                    needles.join(", ")
                                )),
                            );
                        }
                    }
                }
            }
        }
    }

    fn check_rules(
        &self,
        content: &str,
        manifest: &Manifest,
        out: &mut Vec<Diagnostic>,
    ) -> Result<()> {
        for rule in &manifest.validation.rules {
            let Some(pattern) = &rule.pattern else {
                continue;
            };
            let re = Regex::new(pattern).map_err(|e| {
                DocmanError::Config(format!("rule '{}': invalid pattern: {e}", rule.id))
            })?;
            if !re.is_match(content) {
                let mut diag = Diagnostic::new(
                    rule.id.clone(),
                    rule.effective_severity(),
                    rule.message.clone(),
                );
                if let Some(suggestion) = &rule.suggestion {
                    diag = diag.with_suggestion(suggestion.clone());
                }
                out.push(diag);
            }
        }
        Ok(())
    }

    /// Run external check scripts as opaque validators. Scripts run from
    /// the project root and receive the document's root-relative path, so
    /// behavior never depends on the invoking directory. Any failure mode
    /// (missing script, spawn error, non-zero exit) becomes an error
    /// diagnostic with the script's output folded in.
    fn check_scripts(&self, doc_path: &Path, manifest: &Manifest, out: &mut Vec<Diagnostic>) {
        let doc_arg = self.root_relative(doc_path);
        for script in &manifest.validation.scripts {
            let rule_id = format!("script:{}", script.name);
            let script_path = self.project_root.join(&script.path);
            if !script_path.is_file() {
                out.push(Diagnostic::error(
                    rule_id,
                    format!("check script not found: {}", script_path.display()),
                ));
                continue;
            }

            let output = Command::new(&script_path)
                .arg(&doc_arg)
                .current_dir(&self.project_root)
                .output();
            match output {
                Ok(output) if output.status.success() => {}
                Ok(output) => {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let detail: Vec<&str> = [stdout.trim(), stderr.trim()]
                        .into_iter()
                        .filter(|s| !s.is_empty())
                        .collect();
                    let message = if detail.is_empty() {
                        format!("check '{}' failed", script.name)
                    } else {
                        format!("check '{}' failed: {}", script.name, detail.join("; "))
                    };
                    out.push(Diagnostic::error(rule_id, message));
                }
                Err(e) => {
                    out.push(Diagnostic::error(
                        rule_id,
                        format!("check '{}' could not run: {e}", script.name),
                    ));
                }
            }
        }
    }

    fn root_relative(&self, doc_path: &Path) -> PathBuf {
        if doc_path.is_absolute() {
            return doc_path
                .strip_prefix(&self.project_root)
                .unwrap_or(doc_path)
                .to_path_buf();
        }
        std::env::current_dir()
            .ok()
            .and_then(|cwd| {
                cwd.join(doc_path)
                    .strip_prefix(&self.project_root)
                    .ok()
                    .map(Path::to_path_buf)
            })
            .unwrap_or_else(|| doc_path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Rule, SectionSpec};
    use crate::validate::Severity;

    fn manifest_with_sections(sections: Vec<SectionSpec>) -> Manifest {
        serde_yaml::from_str::<Manifest>("name: Plan\ndoc_type: plan\n")
            .map(|mut m| {
                m.structure.required_sections = sections;
                m
            })
            .unwrap()
    }

    #[test]
    fn test_missing_section_is_error() {
        let manifest = manifest_with_sections(vec![SectionSpec::named("Overview")]);
        let engine = ValidationEngine::new(".");
        let result = engine.validate("# Title\n\nno sections\n", &manifest, None).unwrap();

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].rule_id, MISSING_SECTION);
    }

    #[test]
    fn test_section_contains_check() {
        let mut spec = SectionSpec::named("Steps");
        spec.contains = Some(vec!["- [ ]".to_string(), "- [x]".to_string()]);
        let manifest = manifest_with_sections(vec![spec]);
        let engine = ValidationEngine::new(".");

        let missing = engine
            .validate("## Steps\n\njust prose\n", &manifest, None)
            .unwrap();
        assert!(!missing.valid);

        let present = engine
            .validate("## Steps\n\n- [ ] do it\n", &manifest, None)
            .unwrap();
        assert!(present.valid);
    }

    #[test]
    fn test_pattern_rule_default_warning() {
        let mut manifest = manifest_with_sections(vec![]);
        manifest.validation.rules.push(Rule {
            id: "has-status".into(),
            pattern: Some("(?m)^Status:".into()),
            severity: None,
            message: "should declare a Status line".into(),
            suggestion: None,
            docs: None,
        });
        let engine = ValidationEngine::new(".");

        let result = engine.validate("# Doc\n", &manifest, None).unwrap();
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_pattern_rule_explicit_error() {
        let mut manifest = manifest_with_sections(vec![]);
        manifest.validation.rules.push(Rule {
            id: "has-title".into(),
            pattern: Some("(?m)^# ".into()),
            severity: Some(Severity::Error),
            message: "document needs a title".into(),
            suggestion: None,
            docs: None,
        });
        let engine = ValidationEngine::new(".");

        let result = engine.validate("no title here\n", &manifest, None).unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors[0].rule_id, "has-title");
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let mut manifest = manifest_with_sections(vec![]);
        manifest.validation.rules.push(Rule {
            id: "broken".into(),
            pattern: Some("(".into()),
            severity: None,
            message: "broken".into(),
            suggestion: None,
            docs: None,
        });
        let engine = ValidationEngine::new(".");

        let err = engine.validate("x", &manifest, None).unwrap_err();
        assert!(matches!(err, DocmanError::Config(_)));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let manifest = manifest_with_sections(vec![
            SectionSpec::named("Overview"),
            SectionSpec::named("Risks"),
        ]);
        let engine = ValidationEngine::new(".");
        let content = "## Overview\n\nok\n";

        let first = engine.validate(content, &manifest, None).unwrap();
        let second = engine.validate(content, &manifest, None).unwrap();

        let ids = |r: &ValidationResult| {
            r.errors
                .iter()
                .map(|d| (d.rule_id.clone(), d.message.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[cfg(unix)]
    #[test]
    fn test_script_check_failure_folds_into_errors() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("check.sh");
        // Reads a root-local file, so it only works when run from the
        // project root; echoes its argument so the test can pin it.
        std::fs::write(
            &script,
            "#!/bin/sh\necho \"arg=$1\"\ncat marker.txt >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(dir.path().join("marker.txt"), "seen-from-root").unwrap();
        let doc = dir.path().join("doc.md");
        std::fs::write(&doc, "# Doc\n").unwrap();

        let mut manifest = manifest_with_sections(vec![]);
        manifest.validation.scripts.push(crate::manifest::ScriptCheck {
            name: "lint".into(),
            path: "check.sh".into(),
        });

        let engine = ValidationEngine::new(dir.path());
        let result = engine.validate("# Doc\n", &manifest, Some(&doc)).unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors[0].rule_id, "script:lint");
        // Stdout is captured, the argument is root-relative, and the
        // script ran from the project root.
        assert!(result.errors[0].message.contains("arg=doc.md"));
        assert!(result.errors[0].message.contains("seen-from-root"));
    }

    #[test]
    fn test_missing_script_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = manifest_with_sections(vec![]);
        manifest.validation.scripts.push(crate::manifest::ScriptCheck {
            name: "gone".into(),
            path: "does/not/exist.sh".into(),
        });

        let engine = ValidationEngine::new(dir.path());
        let doc = dir.path().join("doc.md");
        let result = engine.validate("# Doc\n", &manifest, Some(&doc)).unwrap();
        assert!(!result.valid);
        assert!(result.errors[0].message.contains("not found"));
    }
}
