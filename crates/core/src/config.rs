//! Configuration for seqscan runs.
//!
//! Config priority: command-line flags > `--config <FILE>` > user config
//! (`~/.config/seqscan/config.toml`) > built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default length of the token queue between the reader and the classifiers
pub const DEFAULT_INPUT_CAPACITY: usize = 10;

/// Default length of the result queue between the classifiers and the writer
pub const DEFAULT_OUTPUT_CAPACITY: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("no input file specified")]
  MissingInput,
  #[error("no output file specified")]
  MissingOutput,
  #[error("no classifier worker count specified")]
  MissingWorkers,
  #[error("the number of classifier workers cannot be zero")]
  ZeroWorkers,
  #[error("the input buffer length cannot be zero")]
  ZeroInputCapacity,
  #[error("the output buffer length cannot be zero")]
  ZeroOutputCapacity,
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

// ============================================================================
// Pipeline Configuration
// ============================================================================

/// `[pipeline]` section: what to read, where to write, and how wide to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
  /// Text file of whitespace-separated tokens
  #[serde(skip_serializing_if = "Option::is_none")]
  pub input: Option<PathBuf>,

  /// File that receives one tagged result per line
  #[serde(skip_serializing_if = "Option::is_none")]
  pub output: Option<PathBuf>,

  /// Number of classifier workers (required, no default)
  #[serde(skip_serializing_if = "Option::is_none")]
  pub workers: Option<usize>,

  /// Capacity of the reader → classifier queue (default: 10)
  pub input_capacity: usize,

  /// Capacity of the classifier → writer queue (default: 10)
  pub output_capacity: usize,
}

impl Default for PipelineSettings {
  fn default() -> Self {
    Self {
      input: None,
      output: None,
      workers: None,
      input_capacity: DEFAULT_INPUT_CAPACITY,
      output_capacity: DEFAULT_OUTPUT_CAPACITY,
    }
  }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Log level: off, error, warn, info, debug, trace (default: info)
  pub level: String,

  /// Write logs to this file instead of the console
  #[serde(skip_serializing_if = "Option::is_none")]
  pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      file: None,
    }
  }
}

// ============================================================================
// Main Configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  pub pipeline: PipelineSettings,
  pub logging: LoggingConfig,
}

impl Config {
  /// Load configuration.
  ///
  /// An explicit path must exist and parse. Without one, the user config is
  /// used when present and readable, and defaults otherwise.
  pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = explicit {
      return Self::from_file(path);
    }

    if let Some(user_config_path) = Self::user_config_path()
      && user_config_path.exists()
      && let Ok(config) = Self::from_file(&user_config_path)
    {
      return Ok(config);
    }

    Ok(Self::default())
  }

  /// Parse a TOML config file.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Get the user-level config path
  pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SEQSCAN_CONFIG_DIR") {
      return Some(PathBuf::from(path).join("config.toml"));
    }

    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
      return Some(PathBuf::from(path).join("seqscan").join("config.toml"));
    }

    dirs::config_dir().map(|p: PathBuf| p.join("seqscan").join("config.toml"))
  }

  /// Check every required setting and produce the configuration a run needs.
  ///
  /// Errors are reported in a fixed order: missing values first, then zero
  /// capacities, then a zero worker count.
  pub fn validate(&self) -> Result<PipelineConfig, ConfigError> {
    let settings = &self.pipeline;

    let input = settings.input.clone().ok_or(ConfigError::MissingInput)?;
    let output = settings.output.clone().ok_or(ConfigError::MissingOutput)?;
    let workers = settings.workers.ok_or(ConfigError::MissingWorkers)?;

    let config = PipelineConfig {
      input,
      output,
      workers,
      input_capacity: settings.input_capacity,
      output_capacity: settings.output_capacity,
    };
    config.check()?;

    Ok(config)
  }
}

/// A fully specified run: every field is present and every count is at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
  pub input: PathBuf,
  pub output: PathBuf,
  pub workers: usize,
  pub input_capacity: usize,
  pub output_capacity: usize,
}

impl PipelineConfig {
  pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, workers: usize) -> Self {
    Self {
      input: input.into(),
      output: output.into(),
      workers,
      input_capacity: DEFAULT_INPUT_CAPACITY,
      output_capacity: DEFAULT_OUTPUT_CAPACITY,
    }
  }

  pub fn with_capacities(mut self, input_capacity: usize, output_capacity: usize) -> Self {
    self.input_capacity = input_capacity;
    self.output_capacity = output_capacity;
    self
  }

  /// Reject zero-valued counts.
  pub fn check(&self) -> Result<(), ConfigError> {
    if self.input_capacity == 0 {
      return Err(ConfigError::ZeroInputCapacity);
    }
    if self.output_capacity == 0 {
      return Err(ConfigError::ZeroOutputCapacity);
    }
    if self.workers == 0 {
      return Err(ConfigError::ZeroWorkers);
    }
    Ok(())
  }
}
