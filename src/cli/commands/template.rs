//! docman template - render a document template

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::commands::parse_vars;
use crate::cli::output::{emit_human, emit_json, HumanLayout, OutputFormat};
use crate::error::{DocmanError, Result};
use crate::manifest::ManifestLoader;
use crate::template::{substitute, write_output, TemplateFetcher, TemplateResolver};

#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Document type to render (omit with --list)
    pub doc_type: Option<String>,

    /// Write to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// List available document types
    #[arg(long)]
    pub list: bool,

    /// Template variables (key=value, repeatable)
    #[arg(long = "vars", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Fetch the template from a URL or github:owner/repo/path shorthand
    #[arg(long)]
    pub from: Option<String>,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,
}

pub fn run(ctx: &AppContext, args: &TemplateArgs) -> Result<()> {
    let loader = ManifestLoader::new(&ctx.project_root);

    if args.list {
        return list_types(ctx, &loader);
    }

    let Some(doc_type) = &args.doc_type else {
        return Err(DocmanError::Config(
            "specify a document type or use --list".to_string(),
        ));
    };
    let base = match &args.from {
        // An explicit source stands on its own; the type only seeds the
        // default variables below.
        Some(url) => TemplateFetcher::new()?.fetch(url)?,
        None => {
            let manifest = loader.load(doc_type)?;
            TemplateResolver::new(&ctx.project_root).resolve(&manifest)?
        }
    };

    let mut vars = parse_vars(&args.vars)?;
    default_vars(&mut vars, doc_type);
    let content = substitute(&base, &vars);

    if let Some(output) = &args.output {
        write_output(output, &content, args.force)?;
        if ctx.output_format == OutputFormat::Json {
            return emit_json(&TemplateReport {
                doc_type: doc_type.clone(),
                output: Some(output.display().to_string()),
            });
        }
        println!("Wrote {}", output.display());
    } else if ctx.output_format == OutputFormat::Json {
        return emit_json(&serde_json::json!({
            "doc_type": doc_type,
            "content": content,
        }));
    } else {
        print!("{content}");
    }
    Ok(())
}

/// Fill in the standard variables unless the caller overrode them.
pub fn default_vars(vars: &mut BTreeMap<String, String>, doc_type: &str) {
    vars.entry("date".to_string())
        .or_insert_with(|| Utc::now().format("%Y-%m-%d").to_string());
    vars.entry("type".to_string())
        .or_insert_with(|| doc_type.to_string());
}

fn list_types(ctx: &AppContext, loader: &ManifestLoader) -> Result<()> {
    let types = loader.list()?;
    if ctx.output_format == OutputFormat::Json {
        return emit_json(&types);
    }
    let mut layout = HumanLayout::new();
    layout.section("Document types");
    for doc_type in &types {
        match loader.load(doc_type) {
            Ok(manifest) => layout.bullet(&format!("{doc_type} ({})", manifest.name)),
            Err(_) => layout.bullet(doc_type),
        };
    }
    emit_human(layout);
    Ok(())
}

#[derive(Serialize)]
struct TemplateReport {
    doc_type: String,
    output: Option<String>,
}
