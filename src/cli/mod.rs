//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{ArgAction, Parser};

pub use commands::Commands;
pub use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "docman",
    version,
    about = "Registry-backed lifecycle manager for structured project documents",
    long_about = "Create, track, validate, and continuously monitor structured project \
documents (plans, specs, investigations) against per-type manifests."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_json_flag() {
        let cli = Cli::try_parse_from(["docman", "info", "--json"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Json);
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["docman", "-vv", "info"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
