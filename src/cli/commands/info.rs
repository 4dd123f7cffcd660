//! docman info - registry summary

use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{emit_human, emit_json, HumanLayout, OutputFormat};
use crate::error::Result;
use crate::registry::{Registry, RegistryStats, RegistryStore};

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Include per-type counts and sequence counters
    #[arg(long)]
    pub detailed: bool,
}

pub fn run(ctx: &AppContext, args: &InfoArgs) -> Result<()> {
    let store = RegistryStore::open(&ctx.project_root);
    let mut registry = store.load()?;
    // The file's stats can predate the last entry mutation; report live
    // numbers.
    registry.recompute_stats();

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&build_report(&store, &registry, args.detailed));
    }

    let mut layout = HumanLayout::new();
    layout.title("Registry");
    layout.kv("Path", &store.path().display().to_string());
    layout.kv("Version", &registry.version);
    layout.kv("Updated", &registry.updated.to_rfc3339());
    layout.blank();
    layout.section("Documents");
    layout.kv("Total", &registry.stats.total.to_string());
    layout.kv("Valid", &registry.stats.valid.to_string());
    layout.kv("Invalid", &registry.stats.invalid.to_string());
    layout.kv("Pending", &registry.stats.pending.to_string());

    if args.detailed {
        let by_type = count_by_type(&registry);
        if !by_type.is_empty() {
            layout.blank();
            layout.section("By type");
            for (doc_type, count) in &by_type {
                layout.kv(doc_type, &count.to_string());
            }
        }
        if !registry.id_sequences.is_empty() {
            layout.blank();
            layout.section("ID sequences");
            for (key, last) in &registry.id_sequences {
                layout.kv(key, &last.to_string());
            }
        }
    }
    emit_human(layout);
    Ok(())
}

fn count_by_type(registry: &Registry) -> BTreeMap<String, usize> {
    let mut by_type = BTreeMap::new();
    for entry in registry.documents.values() {
        *by_type.entry(entry.doc_type.clone()).or_insert(0) += 1;
    }
    by_type
}

fn build_report(store: &RegistryStore, registry: &Registry, detailed: bool) -> InfoReport {
    InfoReport {
        path: store.path().display().to_string(),
        version: registry.version.clone(),
        updated: registry.updated.to_rfc3339(),
        stats: registry.stats,
        by_type: detailed.then(|| count_by_type(registry)),
        id_sequences: detailed.then(|| registry.id_sequences.clone()),
    }
}

#[derive(Serialize)]
struct InfoReport {
    path: String,
    version: String,
    updated: String,
    stats: RegistryStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    by_type: Option<BTreeMap<String, usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id_sequences: Option<BTreeMap<String, u64>>,
}
