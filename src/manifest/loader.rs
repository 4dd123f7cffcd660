//! Manifest loading and discovery.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DocmanError, Result};

use super::builtin::{builtin_manifest, BUILTIN_TYPES};
use super::types::Manifest;

const MANIFESTS_DIR: &str = "manifests";

/// Loads manifests from `.docman/manifests/<type>.yaml`, falling back to
/// the built-in set for stock types. No caching across invocations: each
/// `load` re-reads from disk.
pub struct ManifestLoader {
    manifests_dir: PathBuf,
}

impl ManifestLoader {
    #[must_use]
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            manifests_dir: project_root.as_ref().join(".docman").join(MANIFESTS_DIR),
        }
    }

    /// Load the manifest for a document type. Project files shadow
    /// built-ins; a type with neither is `UnknownDocType`.
    pub fn load(&self, doc_type: &str) -> Result<Manifest> {
        if let Some(path) = self.project_manifest_path(doc_type) {
            debug!(doc_type, path = %path.display(), "loading project manifest");
            let raw = std::fs::read_to_string(&path)?;
            return parse_manifest(&raw, doc_type, &path.display().to_string());
        }
        if let Some(raw) = builtin_manifest(doc_type) {
            debug!(doc_type, "using built-in manifest");
            return parse_manifest(raw, doc_type, "<built-in>");
        }
        Err(DocmanError::UnknownDocType(doc_type.to_string()))
    }

    /// All known document types: project manifest files plus built-ins.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut types: BTreeSet<String> =
            BUILTIN_TYPES.iter().map(ToString::to_string).collect();
        if self.manifests_dir.is_dir() {
            for entry in std::fs::read_dir(&self.manifests_dir)? {
                let path = entry?.path();
                let is_yaml = path
                    .extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml");
                if !is_yaml {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    types.insert(stem.to_string());
                }
            }
        }
        Ok(types.into_iter().collect())
    }

    fn project_manifest_path(&self, doc_type: &str) -> Option<PathBuf> {
        for ext in ["yaml", "yml"] {
            let candidate = self.manifests_dir.join(format!("{doc_type}.{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}

fn parse_manifest(raw: &str, doc_type: &str, source: &str) -> Result<Manifest> {
    let manifest: Manifest = serde_yaml::from_str(raw)
        .map_err(|e| DocmanError::Config(format!("manifest {source}: {e}")))?;
    if manifest.doc_type != doc_type {
        return Err(DocmanError::Config(format!(
            "manifest {source} declares doc_type '{}' but was loaded for '{doc_type}'",
            manifest.doc_type
        )));
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader_in(dir: &Path) -> ManifestLoader {
        ManifestLoader::new(dir)
    }

    #[test]
    fn test_load_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = loader_in(dir.path()).load("plan").unwrap();
        assert_eq!(manifest.doc_type, "plan");
        assert_eq!(manifest.id_pattern.as_deref(), Some("P-{num}"));
    }

    #[test]
    fn test_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        let err = loader_in(dir.path()).load("memo").unwrap_err();
        assert!(matches!(err, DocmanError::UnknownDocType(_)));
    }

    #[test]
    fn test_project_manifest_shadows_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = dir.path().join(".docman/manifests");
        std::fs::create_dir_all(&manifests).unwrap();
        std::fs::write(
            manifests.join("plan.yaml"),
            "name: Custom Plan\ndoc_type: plan\nid_pattern: 'PLAN-{num}'\n",
        )
        .unwrap();

        let manifest = loader_in(dir.path()).load("plan").unwrap();
        assert_eq!(manifest.name, "Custom Plan");
        assert_eq!(manifest.id_pattern.as_deref(), Some("PLAN-{num}"));
    }

    #[test]
    fn test_doc_type_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = dir.path().join(".docman/manifests");
        std::fs::create_dir_all(&manifests).unwrap();
        std::fs::write(manifests.join("memo.yaml"), "name: Memo\ndoc_type: note\n").unwrap();

        let err = loader_in(dir.path()).load("memo").unwrap_err();
        assert!(matches!(err, DocmanError::Config(_)));
    }

    #[test]
    fn test_list_merges_project_and_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = dir.path().join(".docman/manifests");
        std::fs::create_dir_all(&manifests).unwrap();
        std::fs::write(manifests.join("memo.yaml"), "name: Memo\ndoc_type: memo\n").unwrap();

        let types = loader_in(dir.path()).list().unwrap();
        assert!(types.contains(&"plan".to_string()));
        assert!(types.contains(&"memo".to_string()));
    }
}
