//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, Credentials, Overrides, PipelineConfig};
use crate::engine::{self, ExecutionContext};
use crate::error::{Result, ResultExt};
use crate::output::read_table;
use crate::storage::StorageLocation;
use crate::types::TableName;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                config,
                profile,
                song_data,
                log_data,
                output,
                mode,
            } => {
                let overrides = Overrides {
                    profile: profile.clone(),
                    mode: *mode,
                    song_data: song_data.clone(),
                    log_data: log_data.clone(),
                    output: output.clone(),
                };
                self.run_pipeline(config.as_deref(), &overrides).await
            }
            Commands::Inspect {
                output,
                table,
                limit,
                config,
            } => self.inspect(output, *table, *limit, config.as_deref()).await,
            Commands::Validate { config, profile } => self.validate(config, profile.clone()),
        }
    }

    /// Load the configuration file, or start from defaults when none is given
    fn load_or_default(path: Option<&Path>) -> Result<PipelineConfig> {
        match path {
            Some(path) => load_config(path),
            None => Ok(PipelineConfig::default()),
        }
    }

    /// Run the whole pipeline and print its report
    async fn run_pipeline(&self, config: Option<&Path>, overrides: &Overrides) -> Result<()> {
        let settings = Self::load_or_default(config)?.resolve(overrides)?;
        let ctx = ExecutionContext::new(settings)?;

        let result = engine::run(&ctx).await;
        ctx.shutdown();

        let report = result?;
        self.output(&report)
    }

    /// Print rows from one written table
    async fn inspect(
        &self,
        output: &str,
        table: TableName,
        limit: Option<usize>,
        config: Option<&Path>,
    ) -> Result<()> {
        let credentials = match config {
            Some(path) => load_config(path)?.credentials,
            None => Credentials::default(),
        };
        let location = StorageLocation::for_input(output, &credentials)
            .with_context(|| format!("Cannot open output root '{output}'"))?;

        let rows = read_table(&location, table, limit).await?;
        info!(table = %table, rows = rows.len(), "Read table");
        for row in &rows {
            self.output(row)?;
        }
        Ok(())
    }

    /// Validate a configuration file
    fn validate(&self, config: &Path, profile: Option<String>) -> Result<()> {
        let pipeline = load_config(config)?;
        let profile_name = profile.clone().unwrap_or_else(|| pipeline.profile.clone());
        let settings = pipeline.resolve(&Overrides {
            profile,
            ..Default::default()
        })?;

        self.output(&json!({
            "valid": true,
            "profile": profile_name,
            "mode": settings.mode,
            "parallelism": settings.effective_parallelism(),
            "song_data": settings.song_data,
            "log_data": settings.log_data,
            "output": settings.output,
        }))
    }

    /// Print one value in the selected format
    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value),
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
        }
        .context("Failed to render output")?;
        println!("{rendered}");
        Ok(())
    }
}
