//! docman list - list registered documents

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{emit_human, emit_json, HumanLayout, OutputFormat};
use crate::error::Result;
use crate::registry::{DocStatus, RegistryStore};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only documents of this type
    pub doc_type: Option<String>,

    /// Only documents with this status (valid|invalid|pending)
    #[arg(long)]
    pub status: Option<DocStatus>,

    /// Group documents by directory
    #[arg(long)]
    pub tree: bool,
}

pub fn run(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let store = RegistryStore::open(&ctx.project_root);
    let registry = store.load()?;
    let entries = registry.filter(args.doc_type.as_deref(), args.status);

    if ctx.output_format == OutputFormat::Json {
        let items: Vec<ListItem> = entries
            .iter()
            .map(|(path, entry)| ListItem {
                path: (*path).clone(),
                doc_type: entry.doc_type.clone(),
                status: entry.status,
                registered: entry.registered,
                last_validated: entry.last_validated,
            })
            .collect();
        return emit_json(&items);
    }

    let mut layout = HumanLayout::new();
    if entries.is_empty() {
        layout.push_line("No documents registered.");
        emit_human(layout);
        return Ok(());
    }

    if args.tree {
        let mut by_dir: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (path, entry) in &entries {
            let (dir, file) = match path.rsplit_once('/') {
                Some((dir, file)) => (dir.to_string(), file.to_string()),
                None => (".".to_string(), (*path).clone()),
            };
            by_dir
                .entry(dir)
                .or_default()
                .push(format!("{file} [{}] ({})", entry.doc_type, entry.status));
        }
        for (dir, files) in by_dir {
            layout.section(&dir);
            for file in files {
                layout.bullet(&file);
            }
            layout.blank();
        }
    } else {
        layout.section("Documents");
        for (path, entry) in &entries {
            layout.bullet(&format!("{path} [{}] ({})", entry.doc_type, entry.status));
        }
    }
    emit_human(layout);
    Ok(())
}

#[derive(Serialize)]
struct ListItem {
    path: String,
    #[serde(rename = "type")]
    doc_type: String,
    status: DocStatus,
    registered: DateTime<Utc>,
    #[serde(rename = "lastValidated", skip_serializing_if = "Option::is_none")]
    last_validated: Option<DateTime<Utc>>,
}
