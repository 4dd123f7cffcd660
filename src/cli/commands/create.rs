//! docman create - create a new document from a template

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::app::AppContext;
use crate::cli::commands::{parse_vars, template::default_vars};
use crate::cli::output::{emit_human, emit_json, HumanLayout, OutputFormat};
use crate::error::Result;
use crate::manifest::{Manifest, ManifestLoader};
use crate::registry::{format_id, DocStatus, RegistryStore};
use crate::template::{substitute, write_output, TemplateFetcher, TemplateResolver};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Document type
    pub doc_type: String,

    /// Directory to create the document in
    pub output_dir: PathBuf,

    /// Template variables (key=value, repeatable)
    #[arg(long = "vars", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Issue the next sequence ID for this type
    #[arg(long)]
    pub auto_id: bool,

    /// Register the new document as pending
    #[arg(long)]
    pub register: bool,

    /// Fetch the template from a URL or github: shorthand
    #[arg(long)]
    pub from: Option<String>,

    /// Document name, used in the filename and as the default title
    #[arg(long)]
    pub name: Option<String>,
}

pub fn run(ctx: &AppContext, args: &CreateArgs) -> Result<()> {
    let loader = ManifestLoader::new(&ctx.project_root);
    let store = RegistryStore::open(&ctx.project_root);
    let manifest = loader.load(&args.doc_type)?;

    let base = match &args.from {
        Some(url) => TemplateFetcher::new()?.fetch(url)?,
        None => TemplateResolver::new(&ctx.project_root).resolve(&manifest)?,
    };

    let mut vars = parse_vars(&args.vars)?;
    default_vars(&mut vars, &args.doc_type);

    let id = if args.auto_id {
        let n = store.next_id(manifest.sequence_key())?;
        let pattern = manifest.id_pattern.as_deref().unwrap_or("{num}");
        Some(format_id(pattern, n))
    } else {
        None
    };
    if let Some(id) = &id {
        vars.entry("id".to_string()).or_insert_with(|| id.clone());
    }
    let name = args
        .name
        .clone()
        .or_else(|| vars.get("title").cloned())
        .unwrap_or_else(|| args.doc_type.clone());
    vars.entry("title".to_string())
        .or_insert_with(|| name.clone());

    let content = substitute(&base, &vars);
    let file_name = file_name(&manifest, id.as_deref(), &name, &args.doc_type);
    let target = args.output_dir.join(file_name);
    write_output(&target, &content, false)?;
    info!(path = %target.display(), doc_type = %args.doc_type, "created document");

    let registered = if args.register {
        store.register(&target, &args.doc_type, None, DocStatus::Pending)?;
        true
    } else {
        false
    };

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&CreateReport {
            path: target.display().to_string(),
            doc_type: args.doc_type.clone(),
            id,
            registered,
        });
    }
    let mut layout = HumanLayout::new();
    layout.kv("Created", &target.display().to_string());
    if let Some(id) = &id {
        layout.kv("ID", id);
    }
    if registered {
        layout.kv("Status", "pending");
    }
    emit_human(layout);
    Ok(())
}

/// Build the output filename from the manifest's naming pattern.
/// `{id}`, `{name}`, and `{type}` are substituted; the name is slugified.
fn file_name(manifest: &Manifest, id: Option<&str>, name: &str, doc_type: &str) -> String {
    let pattern = manifest
        .output
        .naming
        .as_deref()
        .unwrap_or("{type}-{name}.md");
    let slug = slugify(name);
    let mut out = pattern
        .replace("{name}", &slug)
        .replace("{type}", doc_type)
        .replace("{id}", id.unwrap_or(""));
    // Collapse separators left behind by an absent id.
    while out.contains("--") {
        out = out.replace("--", "-");
    }
    out.trim_start_matches('-').to_string()
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[derive(Serialize)]
struct CreateReport {
    path: String,
    #[serde(rename = "type")]
    doc_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    registered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Auth Bug Fix"), "auth-bug-fix");
        assert_eq!(slugify("  weird -- Name!  "), "weird-name");
    }

    #[test]
    fn test_file_name_with_id() {
        let manifest: Manifest =
            serde_yaml::from_str("name: Plan\ndoc_type: plan\noutput:\n  naming: '{id}-{name}.md'\n")
                .unwrap();
        assert_eq!(
            file_name(&manifest, Some("P-01"), "Auth Bug", "plan"),
            "P-01-auth-bug.md"
        );
    }

    #[test]
    fn test_file_name_without_id_collapses_separator() {
        let manifest: Manifest =
            serde_yaml::from_str("name: Plan\ndoc_type: plan\noutput:\n  naming: '{id}-{name}.md'\n")
                .unwrap();
        assert_eq!(file_name(&manifest, None, "Auth Bug", "plan"), "auth-bug.md");
    }

    #[test]
    fn test_file_name_default_pattern() {
        let manifest: Manifest = serde_yaml::from_str("name: Memo\ndoc_type: memo\n").unwrap();
        assert_eq!(file_name(&manifest, None, "Weekly", "memo"), "memo-weekly.md");
    }
}
