//! The registry store: load/modify/save of the per-project registry file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DocmanError, Result};
use crate::utils::fs::atomic_write;

const REGISTRY_VERSION: &str = "1.0";
const REGISTRY_FILE: &str = "registry.json";

/// Lifecycle status of a tracked document.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocStatus {
    Valid,
    Invalid,
    Pending,
    Unregistered,
}

impl fmt::Display for DocStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocStatus::Valid => write!(f, "valid"),
            DocStatus::Invalid => write!(f, "invalid"),
            DocStatus::Pending => write!(f, "pending"),
            DocStatus::Unregistered => write!(f, "unregistered"),
        }
    }
}

impl std::str::FromStr for DocStatus {
    type Err = DocmanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "valid" => Ok(Self::Valid),
            "invalid" => Ok(Self::Invalid),
            "pending" => Ok(Self::Pending),
            "unregistered" => Ok(Self::Unregistered),
            other => Err(DocmanError::Config(format!("unknown status '{other}'"))),
        }
    }
}

/// Metadata for one registered document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Optional validator skill associated with this document.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub skill: Option<String>,
    pub registered: DateTime<Utc>,
    #[serde(
        rename = "lastValidated",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub last_validated: Option<DateTime<Utc>>,
    pub status: DocStatus,
}

/// Counts derived from `documents` on every save. Never mutated directly.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub pending: usize,
}

/// The persisted registry structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry {
    pub version: String,
    pub updated: DateTime<Utc>,
    /// Document path (relative to the project root) -> entry.
    #[serde(default)]
    pub documents: BTreeMap<String, RegistryEntry>,
    /// Sequence key -> last issued id.
    #[serde(default)]
    pub id_sequences: BTreeMap<String, u64>,
    #[serde(default)]
    pub stats: RegistryStats,
}

impl Registry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: REGISTRY_VERSION.to_string(),
            updated: Utc::now(),
            documents: BTreeMap::new(),
            id_sequences: BTreeMap::new(),
            stats: RegistryStats::default(),
        }
    }

    /// Recompute derived stats from the live entry set.
    pub fn recompute_stats(&mut self) {
        let mut stats = RegistryStats {
            total: self.documents.len(),
            ..RegistryStats::default()
        };
        for entry in self.documents.values() {
            match entry.status {
                DocStatus::Valid => stats.valid += 1,
                DocStatus::Invalid => stats.invalid += 1,
                DocStatus::Pending => stats.pending += 1,
                DocStatus::Unregistered => {}
            }
        }
        self.stats = stats;
    }

    /// Entries filtered by type and/or status.
    #[must_use]
    pub fn filter(
        &self,
        doc_type: Option<&str>,
        status: Option<DocStatus>,
    ) -> Vec<(&String, &RegistryEntry)> {
        self.documents
            .iter()
            .filter(|(_, e)| doc_type.is_none_or(|t| e.doc_type == t))
            .filter(|(_, e)| status.is_none_or(|s| e.status == s))
            .collect()
    }
}

/// Handle on a project's registry file. All operations are a full
/// load-modify-save cycle so no state survives across invocations.
pub struct RegistryStore {
    project_root: PathBuf,
    path: PathBuf,
}

impl RegistryStore {
    #[must_use]
    pub fn open(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let path = project_root.join(".docman").join(REGISTRY_FILE);
        Self { project_root, path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Canonical registry key for a document path: absolutized against the
    /// invoking directory, lexically normalized, then made relative to the
    /// project root with forward slashes. The same file yields the same key
    /// regardless of where the command runs.
    pub fn canonical_key(&self, path: &Path) -> Result<String> {
        let cwd = std::env::current_dir()?;
        Ok(self.key_from(&cwd, path))
    }

    fn key_from(&self, cwd: &Path, path: &Path) -> String {
        let abs = normalize_path(cwd, path);
        let root = normalize_path(cwd, &self.project_root);
        abs.strip_prefix(&root)
            .unwrap_or(&abs)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Load the registry. A missing file yields a fresh empty registry;
    /// a malformed one is surfaced as `RegistryCorrupt`, never reset.
    pub fn load(&self) -> Result<Registry> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no registry file, starting empty");
            return Ok(Registry::empty());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw).map_err(|e| {
            DocmanError::RegistryCorrupt(format!("{}: {e}", self.path.display()))
        })
    }

    /// Persist the registry: recompute stats, stamp `updated`, write
    /// atomically.
    pub fn save(&self, registry: &mut Registry) -> Result<()> {
        registry.recompute_stats();
        registry.updated = Utc::now();
        let payload = serde_json::to_string_pretty(registry)
            .map_err(|e| DocmanError::Config(format!("serialize registry: {e}")))?;
        atomic_write(&self.path, &payload)?;
        debug!(path = %self.path.display(), entries = registry.documents.len(), "registry saved");
        Ok(())
    }

    /// Upsert an entry for `path`. A prior entry for the same path is
    /// replaced wholesale, never merged.
    pub fn register(
        &self,
        path: &Path,
        doc_type: &str,
        skill: Option<&str>,
        status: DocStatus,
    ) -> Result<String> {
        let key = self.canonical_key(path)?;
        let mut registry = self.load()?;
        registry.documents.insert(
            key.clone(),
            RegistryEntry {
                doc_type: doc_type.to_string(),
                skill: skill.map(str::to_string),
                registered: Utc::now(),
                last_validated: None,
                status,
            },
        );
        self.save(&mut registry)?;
        Ok(key)
    }

    /// Update a registered document's status, stamping `lastValidated`.
    /// No-op (returns false) when the path is not registered.
    pub fn update_status(&self, path: &Path, status: DocStatus) -> Result<bool> {
        let key = self.canonical_key(path)?;
        let mut registry = self.load()?;
        let Some(entry) = registry.documents.get_mut(&key) else {
            return Ok(false);
        };
        entry.status = status;
        entry.last_validated = Some(Utc::now());
        self.save(&mut registry)?;
        Ok(true)
    }

    /// Remove an entry. Returns whether one existed.
    pub fn unregister(&self, path: &Path) -> Result<bool> {
        let key = self.canonical_key(path)?;
        let mut registry = self.load()?;
        let existed = registry.documents.remove(&key).is_some();
        if existed {
            self.save(&mut registry)?;
        }
        Ok(existed)
    }

    /// Issue the next id for a sequence key: load, increment (from 0),
    /// save, return. Every call is a full load+save cycle; there is no
    /// cross-process locking, so concurrent callers can race (accepted
    /// limitation, see README).
    pub fn next_id(&self, sequence_key: &str) -> Result<u64> {
        let mut registry = self.load()?;
        let counter = registry
            .id_sequences
            .entry(sequence_key.to_string())
            .or_insert(0);
        *counter += 1;
        let issued = *counter;
        self.save(&mut registry)?;
        Ok(issued)
    }
}

/// Lexical normalization: absolutize against `base` and resolve `.` and
/// `..` components without touching the filesystem.
fn normalize_path(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
