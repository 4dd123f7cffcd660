//! Template resolution and variable substitution.
//!
//! Resolution order for a document type: the manifest-declared local file,
//! a manifest-declared URL, then the built-in template for stock types.
//! A type with none of these is `NoTemplate`. Explicit `--from` URLs
//! bypass the manifest entirely.

pub mod fetch;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::{DocmanError, Result};
use crate::manifest::Manifest;
use crate::utils::fs::ensure_dir;

pub use fetch::{expand_shorthand, TemplateFetcher};

/// Resolves base templates for document types.
pub struct TemplateResolver {
    project_root: PathBuf,
}

impl TemplateResolver {
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Resolve the base template for a manifest's document type.
    pub fn resolve(&self, manifest: &Manifest) -> Result<String> {
        if let Some(rel) = &manifest.template.path {
            let path = self.project_root.join(rel);
            if !path.is_file() {
                return Err(DocmanError::PathNotFound(path));
            }
            debug!(path = %path.display(), "using manifest template file");
            return Ok(std::fs::read_to_string(path)?);
        }
        if let Some(url) = &manifest.template.url {
            return TemplateFetcher::new()?.fetch(url);
        }
        if let Some(template) = builtin_template(&manifest.doc_type) {
            debug!(doc_type = %manifest.doc_type, "using built-in template");
            return Ok(template.to_string());
        }
        Err(DocmanError::NoTemplate(manifest.doc_type.clone()))
    }
}

/// Replace every `{{key}}` placeholder present in `vars`. Unresolved
/// placeholders are left intact so partially specified templates remain
/// valid documents.
#[must_use]
pub fn substitute(template: &str, vars: &BTreeMap<String, String>) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").expect("valid regex"));

    re.replace_all(template, |caps: &regex::Captures<'_>| {
        match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}

/// Write resolved content to `path`. Refuses to overwrite an existing file
/// unless `force`.
pub fn write_output(path: &Path, content: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(DocmanError::OutputExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Built-in template for the stock document types.
#[must_use]
pub fn builtin_template(doc_type: &str) -> Option<&'static str> {
    match doc_type {
        "plan" => Some(PLAN_TEMPLATE),
        "spec" => Some(SPEC_TEMPLATE),
        "investigation" => Some(INVESTIGATION_TEMPLATE),
        _ => None,
    }
}

const PLAN_TEMPLATE: &str = "\
# {{title}}

Status: draft
ID: {{id}}
Date: {{date}}

## Overview

{{overview}}

## Steps

- [ ]

## Risks

";

const SPEC_TEMPLATE: &str = "\
# {{title}}

Owner: {{owner}}
ID: {{id}}
Date: {{date}}

## Overview

{{overview}}

## Requirements

## Acceptance Criteria

-
";

const INVESTIGATION_TEMPLATE: &str = "\
# {{title}}

ID: {{id}}
Date: {{date}}

## Summary

{{summary}}

## Findings

## Next Steps

-
";
