//! CLI commands and argument parsing

use crate::types::DestinationKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Extract CRM objects, write CSV files and load them into an analytical store
#[derive(Parser, Debug)]
#[command(name = "crm-loader")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Destination store, overriding configuration and environment
    #[arg(short, long, global = true)]
    pub destination: Option<DestinationKind>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract every object type, write CSV files and load them
    Sync {
        /// Object types to sync (comma-separated, empty = all configured)
        #[arg(long)]
        objects: Option<String>,

        /// Directory CSV files are written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Write CSV files only, without loading the destination
        #[arg(long)]
        skip_load: bool,
    },

    /// List property names and labels of one object type
    Properties {
        /// Object type name
        object: String,
    },

    /// List custom object schemas
    Schemas,

    /// Test connectivity to the destination store
    Check,

    /// List configured object types
    Objects,

    /// Cross-match identifier columns between CSV files
    Relationships {
        /// Directory containing CSV files (defaults to the output directory)
        dir: Option<PathBuf>,
    },

    /// Generate sample CSV files
    Sample {
        /// Directory sample files are written to
        #[arg(default_value = crate::sample::DEFAULT_SAMPLE_DIR)]
        dir: PathBuf,

        /// Rows per object type
        #[arg(long, default_value_t = crate::sample::DEFAULT_SAMPLE_ROWS)]
        rows: usize,

        /// Object types to generate (comma-separated, empty = all configured)
        #[arg(long)]
        objects: Option<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sync() {
        let cli = Cli::try_parse_from([
            "crm-loader",
            "--destination",
            "duckdb",
            "sync",
            "--objects",
            "contacts,deals",
            "--skip-load",
        ])
        .unwrap();

        assert_eq!(cli.destination, Some(DestinationKind::Duckdb));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Sync {
                objects,
                output_dir,
                skip_load,
            } => {
                assert_eq!(objects.as_deref(), Some("contacts,deals"));
                assert!(output_dir.is_none());
                assert!(skip_load);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_sample_defaults() {
        let cli = Cli::try_parse_from(["crm-loader", "sample", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Sample { dir, rows, objects } => {
                assert_eq!(dir, PathBuf::from("sample_hubspot_data"));
                assert_eq!(rows, 100);
                assert!(objects.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_properties_requires_object() {
        assert!(Cli::try_parse_from(["crm-loader", "properties"]).is_err());
    }
}
