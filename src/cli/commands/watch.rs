//! docman watch - re-validate documents on file change

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use console::style;
use tracing::{info, warn};

use crate::app::AppContext;
use crate::cli::commands::resolve_doc_type;
use crate::error::{DocmanError, Result};
use crate::manifest::ManifestLoader;
use crate::registry::{DocStatus, RegistryStore};
use crate::validate::ValidationEngine;
use crate::watch::{WatchLoop, DEFAULT_DEBOUNCE};

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Path to watch (defaults to the project root)
    pub path: Option<PathBuf>,

    /// Debounce window in milliseconds
    #[arg(long, value_name = "MS")]
    pub debounce: Option<u64>,
}

pub fn run(ctx: &AppContext, args: &WatchArgs) -> Result<()> {
    let watch_path = args
        .path
        .clone()
        .unwrap_or_else(|| ctx.project_root.clone());
    let debounce = args
        .debounce
        .map_or(DEFAULT_DEBOUNCE, Duration::from_millis);

    let (watch_loop, stop) = WatchLoop::new(&watch_path, debounce)?;
    ctrlc::set_handler(move || stop.stop())
        .map_err(|e| DocmanError::Watch(format!("signal handler: {e}")))?;

    info!(
        path = %watch_path.display(),
        debounce_ms = debounce.as_millis() as u64,
        "watching for changes (ctrl-c to stop)"
    );
    println!("Watching {} (ctrl-c to stop)", watch_path.display());

    watch_loop.run(|batch| validate_batch(ctx, batch))?;
    println!("Stopped.");
    Ok(())
}

/// One validation pass over a debounced batch. Failures are reported and
/// never propagate: the loop must survive to the next event.
fn validate_batch(ctx: &AppContext, batch: &[PathBuf]) {
    for path in batch {
        // The registry file itself churns during passes; never validate it.
        if path.starts_with(ctx.docman_dir()) {
            continue;
        }
        if !path.extension().is_some_and(|ext| ext == "md") {
            continue;
        }
        if let Err(e) = validate_one(ctx, path) {
            warn!(path = %path.display(), error = %e, "validation pass failed");
            eprintln!("{}: {e}", path.display());
        }
    }
}

fn validate_one(ctx: &AppContext, path: &Path) -> Result<()> {
    let loader = ManifestLoader::new(&ctx.project_root);
    let store = RegistryStore::open(&ctx.project_root);
    let engine = ValidationEngine::new(&ctx.project_root);
    let registry = store.load()?;
    let key = store.canonical_key(path)?;

    let doc_type = match resolve_doc_type(None, &registry, &key, path, &loader) {
        Ok(doc_type) => doc_type,
        // Untyped markdown files are none of our business.
        Err(DocmanError::Config(_)) => return Ok(()),
        Err(e) => return Err(e),
    };
    let manifest = loader.load(&doc_type)?;
    let content = std::fs::read_to_string(path)?;
    let result = engine.validate(&content, &manifest, Some(path))?;

    if registry.documents.contains_key(&key) {
        let status = if result.valid {
            DocStatus::Valid
        } else {
            DocStatus::Invalid
        };
        store.update_status(path, status)?;
    }

    let verdict = if result.valid {
        style("valid").green().to_string()
    } else {
        style("invalid").red().to_string()
    };
    println!(
        "{key}: {verdict} ({} errors, {} warnings)",
        result.errors.len(),
        result.warnings.len()
    );
    for diag in result.errors.iter().chain(&result.warnings) {
        println!("  {diag}");
    }
    Ok(())
}
