//! docman register - track a document in the registry

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::app::AppContext;
use crate::cli::commands::resolve_doc_type;
use crate::cli::output::{emit_human, emit_json, HumanLayout, OutputFormat};
use crate::error::{DocmanError, Result};
use crate::manifest::ManifestLoader;
use crate::registry::{DocStatus, RegistryStore};

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Document file to register
    pub file: PathBuf,

    /// Document type (inferred from the filename when omitted)
    #[arg(long = "type")]
    pub doc_type: Option<String>,

    /// Validator skill to associate with the document
    #[arg(long)]
    pub skill: Option<String>,

    /// Replace an existing registration
    #[arg(long)]
    pub force: bool,
}

pub fn run(ctx: &AppContext, args: &RegisterArgs) -> Result<()> {
    if !args.file.is_file() {
        return Err(DocmanError::PathNotFound(args.file.clone()));
    }

    let loader = ManifestLoader::new(&ctx.project_root);
    let store = RegistryStore::open(&ctx.project_root);
    let registry = store.load()?;
    let key = store.canonical_key(&args.file)?;

    if registry.documents.contains_key(&key) && !args.force {
        return Err(DocmanError::Config(format!(
            "'{key}' is already registered (use --force to replace)"
        )));
    }

    let doc_type = resolve_doc_type(
        args.doc_type.as_deref(),
        &registry,
        &key,
        &args.file,
        &loader,
    )?;
    // Registering a type we cannot validate later would be a trap.
    loader.load(&doc_type)?;

    let key = store.register(
        &args.file,
        &doc_type,
        args.skill.as_deref(),
        DocStatus::Pending,
    )?;
    info!(path = %key, doc_type, "registered document");

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&RegisterReport {
            path: key,
            doc_type,
            status: DocStatus::Pending,
        });
    }
    let mut layout = HumanLayout::new();
    layout.kv("Registered", &key);
    layout.kv("Type", &doc_type);
    layout.kv("Status", "pending");
    emit_human(layout);
    Ok(())
}

#[derive(Serialize)]
struct RegisterReport {
    path: String,
    #[serde(rename = "type")]
    doc_type: String,
    status: DocStatus,
}
