//! CLI command implementations.
//!
//! Each subcommand has its own module with an Args struct and a
//! `run(ctx, args)` function.

use std::collections::BTreeMap;
use std::path::Path;

use clap::Subcommand;

pub mod check;
pub mod create;
pub mod info;
pub mod list;
pub mod register;
pub mod template;
pub mod unregister;
pub mod watch;

use crate::app::AppContext;
use crate::error::{DocmanError, Result};
use crate::manifest::ManifestLoader;
use crate::registry::Registry;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a document template
    Template(template::TemplateArgs),

    /// Register a document in the project registry
    Register(register::RegisterArgs),

    /// Remove a document from the registry
    Unregister(unregister::UnregisterArgs),

    /// List registered documents
    List(list::ListArgs),

    /// Show registry summary
    Info(info::InfoArgs),

    /// Validate documents against their manifests
    Check(check::CheckArgs),

    /// Create a new document from a template
    Create(create::CreateArgs),

    /// Watch a path and re-validate on change
    Watch(watch::WatchArgs),
}

/// Dispatch a command to its handler.
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Template(args) => template::run(ctx, args),
        Commands::Register(args) => register::run(ctx, args),
        Commands::Unregister(args) => unregister::run(ctx, args),
        Commands::List(args) => list::run(ctx, args),
        Commands::Info(args) => info::run(ctx, args),
        Commands::Check(args) => check::run(ctx, args),
        Commands::Create(args) => create::run(ctx, args),
        Commands::Watch(args) => watch::run(ctx, args),
    }
}

/// Parse repeated `--vars key=value` pairs into a map.
pub fn parse_vars(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(DocmanError::Config(format!(
                "invalid --vars entry '{pair}' (expected key=value)"
            )));
        };
        vars.insert(key.trim().to_string(), value.to_string());
    }
    Ok(vars)
}

/// Decide the document type for a path: an explicit flag wins, then the
/// registry entry, then a filename prefix matching a known type
/// (`plan-auth.md` -> `plan`).
pub fn resolve_doc_type(
    explicit: Option<&str>,
    registry: &Registry,
    registry_key: &str,
    path: &Path,
    loader: &ManifestLoader,
) -> Result<String> {
    if let Some(doc_type) = explicit {
        return Ok(doc_type.to_string());
    }
    if let Some(entry) = registry.documents.get(registry_key) {
        return Ok(entry.doc_type.clone());
    }
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let known = loader.list()?;
    for doc_type in &known {
        if stem == doc_type || stem.starts_with(&format!("{doc_type}-")) {
            return Ok(doc_type.clone());
        }
    }
    Err(DocmanError::Config(format!(
        "cannot determine document type for '{}' (use --type)",
        path.display()
    )))
}
