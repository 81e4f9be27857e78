//! CLI module
//!
//! Command-line interface for the pipeline.
//!
//! # Commands
//!
//! - `run` - Rebuild all tables from the configured sources
//! - `inspect` - Print rows of a written table
//! - `validate` - Check a configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
