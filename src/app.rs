use std::path::{Path, PathBuf};

use crate::cli::{Cli, OutputFormat};
use crate::error::Result;

/// Shared context threaded through every command.
///
/// Holds the resolved project root and output preferences. Stores are opened
/// per-operation (load at entry, save at exit) so state is never cached
/// across invocations.
pub struct AppContext {
    /// Directory containing the `.docman` marker directory.
    pub project_root: PathBuf,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Ok(Self {
            project_root: find_project_root()?,
            output_format: cli.output_format(),
            verbosity: cli.verbose,
        })
    }

    /// The `.docman` directory under the project root.
    #[must_use]
    pub fn docman_dir(&self) -> PathBuf {
        self.project_root.join(".docman")
    }
}

/// Locate the project root: `DOCMAN_ROOT` env override, else the nearest
/// ancestor of the working directory containing `.docman`, else the working
/// directory itself (first use is expected to start from scratch).
pub fn find_project_root() -> Result<PathBuf> {
    if let Ok(root) = std::env::var("DOCMAN_ROOT") {
        return Ok(PathBuf::from(root));
    }
    let cwd = std::env::current_dir()?;
    if let Some(found) = find_upwards(&cwd, ".docman") {
        return Ok(found);
    }
    Ok(cwd)
}

fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(name).is_dir() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_upwards_locates_marker() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::create_dir(dir.path().join(".docman")).unwrap();

        let found = find_upwards(&nested, ".docman").unwrap();
        assert_eq!(found, dir.path());
    }

    #[test]
    fn test_find_upwards_missing_marker() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_upwards(dir.path(), ".does-not-exist").is_none());
    }
}
