//! CLI commands and argument parsing

use crate::types::{ExecutionMode, TableName};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Song-play star schema ETL
#[derive(Parser, Debug)]
#[command(name = "songplay-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild all five tables from the catalog and activity sources
    Run {
        /// Pipeline configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Profile to use from the configuration file
        #[arg(short, long)]
        profile: Option<String>,

        /// Song catalog location (local path or cloud URL)
        #[arg(long)]
        song_data: Option<String>,

        /// Activity log location (local path or cloud URL)
        #[arg(long)]
        log_data: Option<String>,

        /// Output root
        /// Supports: /path, s3://bucket/path, r2://bucket/path, gs://bucket/path, az://container/path
        #[arg(short, long)]
        output: Option<String>,

        /// Execution mode
        #[arg(short, long)]
        mode: Option<ExecutionMode>,
    },

    /// Print rows of a written table, one JSON object per line
    Inspect {
        /// Output root the table was written under
        #[arg(short, long)]
        output: String,

        /// Table to read
        #[arg(short, long, value_parser = parse_table)]
        table: TableName,

        /// Maximum rows to print
        #[arg(long)]
        limit: Option<usize>,

        /// Configuration file supplying storage credentials
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate a configuration file and resolve its profile
    Validate {
        /// Pipeline configuration file (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Profile to resolve instead of the file's default
        #[arg(short, long)]
        profile: Option<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one document per line)
    Json,
    /// Human-readable output
    Pretty,
}

fn parse_table(name: &str) -> std::result::Result<TableName, String> {
    TableName::parse(name).ok_or_else(|| {
        let known: Vec<&str> = TableName::ALL.iter().map(TableName::as_str).collect();
        format!("unknown table '{name}' (expected one of: {})", known.join(", "))
    })
}
