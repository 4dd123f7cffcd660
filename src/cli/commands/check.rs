//! docman check - validate documents against their manifests

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::app::AppContext;
use crate::cli::commands::resolve_doc_type;
use crate::cli::output::{emit_json, OutputFormat};
use crate::error::{DocmanError, Result};
use crate::manifest::ManifestLoader;
use crate::registry::{DocStatus, Registry, RegistryStore};
use crate::validate::{fix_missing_sections, Diagnostic, ValidationEngine};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// File or directory to check (defaults to all registered documents)
    pub path: Option<PathBuf>,

    /// Document type override
    #[arg(long = "type")]
    pub doc_type: Option<String>,

    /// Warnings also fail the overall verdict
    #[arg(long)]
    pub strict: bool,

    /// Recurse into directories, checking every markdown file
    #[arg(long)]
    pub recursive: bool,

    /// Insert stubs for missing required sections
    #[arg(long)]
    pub fix: bool,

    /// With --fix: preview changes without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(ctx: &AppContext, args: &CheckArgs) -> Result<()> {
    let loader = ManifestLoader::new(&ctx.project_root);
    let store = RegistryStore::open(&ctx.project_root);
    let engine = ValidationEngine::new(&ctx.project_root);
    let registry = store.load()?;

    let (targets, batch) = collect_targets(ctx, args, &registry)?;
    let mut reports = Vec::with_capacity(targets.len());

    for path in &targets {
        match check_one(args, &loader, &store, &engine, &registry, path) {
            Ok(report) => reports.push(report),
            // In batch mode a bad file must not stop the rest.
            Err(e) if batch => reports.push(FileReport::failed(
                store
                    .canonical_key(path)
                    .unwrap_or_else(|_| path.display().to_string()),
                e.to_string(),
            )),
            Err(e) => return Err(e),
        }
    }

    let failed = reports.iter().filter(|r| !r.passes(args.strict)).count();
    emit(ctx, args, &reports, failed)?;

    if failed > 0 {
        return Err(DocmanError::ValidationFailed(format!(
            "{failed} of {} documents failed",
            reports.len()
        )));
    }
    Ok(())
}

/// Resolve the set of files to check. The bool is true when per-file
/// failures should be collected instead of aborting.
fn collect_targets(
    ctx: &AppContext,
    args: &CheckArgs,
    registry: &Registry,
) -> Result<(Vec<PathBuf>, bool)> {
    match &args.path {
        Some(path) if path.is_dir() => {
            if !args.recursive {
                return Err(DocmanError::Config(format!(
                    "'{}' is a directory (use --recursive)",
                    path.display()
                )));
            }
            let mut files: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
                .collect();
            files.sort();
            Ok((files, true))
        }
        Some(path) if path.is_file() => Ok((vec![path.clone()], false)),
        Some(path) => Err(DocmanError::PathNotFound(path.clone())),
        None => {
            // All registered documents, in registry (sorted key) order.
            let files = registry
                .documents
                .keys()
                .map(|key| ctx.project_root.join(key))
                .collect();
            Ok((files, true))
        }
    }
}

fn check_one(
    args: &CheckArgs,
    loader: &ManifestLoader,
    store: &RegistryStore,
    engine: &ValidationEngine,
    registry: &Registry,
    path: &Path,
) -> Result<FileReport> {
    let key = store.canonical_key(path)?;
    if !path.is_file() {
        return Err(DocmanError::PathNotFound(path.to_path_buf()));
    }

    let doc_type = resolve_doc_type(args.doc_type.as_deref(), registry, &key, path, loader)?;
    let manifest = loader.load(&doc_type)?;
    let mut content = std::fs::read_to_string(path)?;

    let mut fixed = Vec::new();
    if args.fix {
        let outcome = fix_missing_sections(&content, &manifest);
        if outcome.changed() {
            fixed = outcome.inserted.clone();
            if args.dry_run {
                debug!(path = %key, "dry-run, not writing fixes");
            } else {
                std::fs::write(path, &outcome.content)?;
                content = outcome.content;
            }
        }
    }

    let result = engine.validate(&content, &manifest, Some(path))?;

    // Status write-back only for documents that are already registered;
    // checking never implicitly registers.
    if registry.documents.contains_key(&key) {
        let status = if result.valid {
            DocStatus::Valid
        } else {
            DocStatus::Invalid
        };
        store.update_status(path, status)?;
    }

    Ok(FileReport {
        path: key,
        doc_type: Some(doc_type),
        valid: result.valid,
        errors: result.errors,
        warnings: result.warnings,
        fixed,
        dry_run: args.fix && args.dry_run,
    })
}

fn emit(ctx: &AppContext, args: &CheckArgs, reports: &[FileReport], failed: usize) -> Result<()> {
    if ctx.output_format == OutputFormat::Json {
        return emit_json(&CheckReport {
            results: reports,
            total: reports.len(),
            failed,
            strict: args.strict,
        });
    }

    for report in reports {
        let verdict = if report.valid {
            style("valid").green().to_string()
        } else {
            style("invalid").red().to_string()
        };
        println!("{}: {verdict}", report.path);
        for diag in report.errors.iter().chain(&report.warnings) {
            println!("  {diag}");
        }
        if !report.fixed.is_empty() {
            let action = if report.dry_run { "would insert" } else { "inserted" };
            println!("  fix: {action} {}", report.fixed.join(", "));
        }
    }
    println!();
    println!("{} checked, {failed} failed", reports.len());
    Ok(())
}

#[derive(Serialize)]
struct CheckReport<'a> {
    results: &'a [FileReport],
    total: usize,
    failed: usize,
    strict: bool,
}

#[derive(Serialize)]
pub struct FileReport {
    pub path: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    pub valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fixed: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
}

impl FileReport {
    fn failed(path: String, message: String) -> Self {
        Self {
            path,
            doc_type: None,
            valid: false,
            errors: vec![Diagnostic::error("check-failed", message)],
            warnings: Vec::new(),
            fixed: Vec::new(),
            dry_run: false,
        }
    }

    fn passes(&self, strict: bool) -> bool {
        self.valid && (!strict || self.warnings.is_empty())
    }
}
