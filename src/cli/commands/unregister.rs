//! docman unregister - remove a document from the registry

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{emit_json, OutputFormat};
use crate::error::Result;
use crate::registry::RegistryStore;

#[derive(Args, Debug)]
pub struct UnregisterArgs {
    /// Document file to remove
    pub file: PathBuf,
}

pub fn run(ctx: &AppContext, args: &UnregisterArgs) -> Result<()> {
    let store = RegistryStore::open(&ctx.project_root);
    let key = store.canonical_key(&args.file)?;
    let removed = store.unregister(&args.file)?;
    if removed {
        info!(path = %key, "unregistered document");
    }

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&serde_json::json!({ "path": key, "removed": removed }));
    }
    if removed {
        println!("Unregistered {key}");
    } else {
        println!("Not registered: {key}");
    }
    Ok(())
}
