//! Pipeline configuration
//!
//! The configuration file is YAML with named profiles, one per deployment
//! target. Each profile names the two input locations and the output root:
//!
//! ```yaml
//! profile: local
//! mode: local
//! profiles:
//!   local:
//!     song_data: ./data/song_data
//!     log_data: ./data/log_data
//!     output: ./output
//!   aws:
//!     song_data: s3://my-bucket/song_data
//!     log_data: s3://my-bucket/log_data
//!     output: s3://my-bucket/warehouse
//! credentials:
//!   aws_access_key_id: AKIA...
//!   aws_secret_access_key: ...
//! ```
//!
//! Command-line flags override file values through [`Overrides`].

use crate::error::{Error, Result};
use crate::types::ExecutionMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Page value marking a song-play event in the activity log
pub const DEFAULT_PLAY_PAGE: &str = "NextSong";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Active profile name
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Execution mode
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Maximum concurrent I/O operations in cluster mode
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Named input/output locations
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileConfig>,

    /// Remote storage credentials
    #[serde(default)]
    pub credentials: Credentials,

    /// Transformation settings
    #[serde(default)]
    pub transform: TransformConfig,

    /// Parquet output settings
    #[serde(default)]
    pub parquet: ParquetSettings,
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_parallelism() -> usize {
    8
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            mode: ExecutionMode::default(),
            parallelism: default_parallelism(),
            profiles: BTreeMap::new(),
            credentials: Credentials::default(),
            transform: TransformConfig::default(),
            parquet: ParquetSettings::default(),
        }
    }
}

/// Input and output locations for one deployment target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Catalog (song/artist) source location
    #[serde(default)]
    pub song_data: Option<String>,

    /// Activity (listening log) source location
    #[serde(default)]
    pub log_data: Option<String>,

    /// Output root location
    #[serde(default)]
    pub output: Option<String>,
}

/// Credentials for S3-compatible object stores
///
/// Unset fields fall back to the standard `AWS_*` environment variables.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub aws_access_key_id: Option<String>,
    #[serde(default)]
    pub aws_secret_access_key: Option<String>,
    #[serde(default)]
    pub aws_region: Option<String>,
    /// Custom endpoint (R2, MinIO)
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "aws_access_key_id",
                &self.aws_access_key_id.as_ref().map(|_| "***"),
            )
            .field(
                "aws_secret_access_key",
                &self.aws_secret_access_key.as_ref().map(|_| "***"),
            )
            .field("aws_region", &self.aws_region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Transformation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// `page` value that marks a qualifying song-play event
    #[serde(default = "default_play_page")]
    pub play_page: String,
}

fn default_play_page() -> String {
    DEFAULT_PLAY_PAGE.to_string()
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            play_page: default_play_page(),
        }
    }
}

/// Parquet compression codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionKind {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    None,
}

/// Parquet output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParquetSettings {
    #[serde(default)]
    pub compression: CompressionKind,

    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

fn default_row_group_size() -> usize {
    1024 * 1024
}

impl Default for ParquetSettings {
    fn default() -> Self {
        Self {
            compression: CompressionKind::default(),
            row_group_size: default_row_group_size(),
        }
    }
}

// ============================================================================
// Overrides and resolved settings
// ============================================================================

/// Values supplied on the command line; each one wins over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub mode: Option<ExecutionMode>,
    pub song_data: Option<String>,
    pub log_data: Option<String>,
    pub output: Option<String>,
}

/// Fully resolved settings for a single run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub mode: ExecutionMode,
    pub parallelism: usize,
    pub song_data: String,
    pub log_data: String,
    pub output: String,
    pub credentials: Credentials,
    pub transform: TransformConfig,
    pub parquet: ParquetSettings,
}

impl PipelineConfig {
    /// Check internal consistency without resolving a profile
    pub fn validate(&self) -> Result<()> {
        if self.parallelism == 0 {
            return Err(Error::invalid_value("parallelism", "must be at least 1"));
        }
        if self.parquet.row_group_size == 0 {
            return Err(Error::invalid_value(
                "parquet.row_group_size",
                "must be at least 1",
            ));
        }
        if self.transform.play_page.trim().is_empty() {
            return Err(Error::invalid_value(
                "transform.play_page",
                "must not be empty",
            ));
        }
        if !self.profiles.is_empty() && !self.profiles.contains_key(&self.profile) {
            return Err(Error::invalid_value(
                "profile",
                format!("profile '{}' is not defined", self.profile),
            ));
        }
        Ok(())
    }

    /// Merge the active profile with command-line overrides
    pub fn resolve(&self, overrides: &Overrides) -> Result<RunSettings> {
        let profile_name = overrides.profile.as_deref().unwrap_or(&self.profile);
        let profile = match self.profiles.get(profile_name) {
            Some(p) => p.clone(),
            None if overrides.profile.is_some() => {
                return Err(Error::invalid_value(
                    "profile",
                    format!("profile '{profile_name}' is not defined"),
                ));
            }
            None => ProfileConfig::default(),
        };

        let pick = |cli: &Option<String>, file: Option<String>, field: &str| {
            cli.clone()
                .or(file)
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| Error::missing_field(format!("profiles.{profile_name}.{field}")))
        };

        Ok(RunSettings {
            mode: overrides.mode.unwrap_or(self.mode),
            parallelism: self.parallelism.max(1),
            song_data: pick(&overrides.song_data, profile.song_data, "song_data")?,
            log_data: pick(&overrides.log_data, profile.log_data, "log_data")?,
            output: pick(&overrides.output, profile.output, "output")?,
            credentials: self.credentials.clone(),
            transform: self.transform.clone(),
            parquet: self.parquet.clone(),
        })
    }
}

impl RunSettings {
    /// Concurrency the execution context may use
    pub fn effective_parallelism(&self) -> usize {
        match self.mode {
            ExecutionMode::Local => 1,
            ExecutionMode::Cluster => self.parallelism.max(1),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load and validate a pipeline config from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        }
    })?;
    load_config_from_str(&content)
}

/// Load and validate a pipeline config from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<PipelineConfig> {
    let config: PipelineConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}
