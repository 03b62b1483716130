//! seqscan CLI - tag nucleotide tokens that contain a `G T+ C` run

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, error::ErrorKind};
use seqscan::{Config, ConfigError, PipelineError, PipelineResult, run_pipeline};
use tracing::{error, info};

mod logging;

use logging::init_logging;

const EXIT_CONFIG: u8 = 1;
const EXIT_SOURCE_NOT_FOUND: u8 = 2;
const EXIT_SINK_UNOPENABLE: u8 = 3;
const EXIT_FAILURE: u8 = 4;

#[derive(Parser, Debug)]
#[command(name = "seqscan")]
#[command(about = "Tag each whitespace-separated token of a file with whether it contains a G T+ C run")]
#[command(disable_help_flag = true)]
#[command(after_help = "\
EXAMPLES:
  seqscan -i reads.txt -o tagged.txt -h 4
  seqscan -i reads.txt -o tagged.txt -h 8 -L 64 -l 64
  seqscan --config run.toml -h 2

Flags override the config file ([pipeline] and [logging] sections).")]
struct Cli {
  /// Input file of whitespace-separated tokens
  #[arg(short = 'i', long = "input", value_name = "FILE")]
  input: Option<PathBuf>,

  /// Output file, one `<token> si|no` line per token
  #[arg(short = 'o', long = "output", value_name = "FILE")]
  output: Option<PathBuf>,

  /// Number of classifier workers
  #[arg(short = 'h', long = "workers", value_name = "N")]
  workers: Option<usize>,

  /// Length of the token queue (default: 10)
  #[arg(short = 'L', long = "input-capacity", value_name = "N")]
  input_capacity: Option<usize>,

  /// Length of the result queue (default: 10)
  #[arg(short = 'l', long = "output-capacity", value_name = "N")]
  output_capacity: Option<usize>,

  /// Config file to use instead of the user config
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Log level: off, error, warn, info, debug, trace
  #[arg(long, value_name = "LEVEL")]
  log_level: Option<String>,

  /// Print help
  #[arg(long, action = ArgAction::Help)]
  help: Option<bool>,
}

impl Cli {
  /// Load the config file and lay the command-line flags over it.
  fn load_config(&self) -> Result<Config> {
    let mut config = Config::load(self.config.as_deref()).context("Failed to load configuration")?;
    self.apply_overrides(&mut config);
    Ok(config)
  }

  fn apply_overrides(&self, config: &mut Config) {
    let settings = &mut config.pipeline;

    if let Some(input) = &self.input {
      settings.input = Some(input.clone());
    }
    if let Some(output) = &self.output {
      settings.output = Some(output.clone());
    }
    if let Some(workers) = self.workers {
      settings.workers = Some(workers);
    }
    if let Some(capacity) = self.input_capacity {
      settings.input_capacity = capacity;
    }
    if let Some(capacity) = self.output_capacity {
      settings.output_capacity = capacity;
    }
    if let Some(level) = &self.log_level {
      config.logging.level = level.clone();
    }
  }
}

/// Validate the merged configuration and run the pipeline once.
async fn run(config: &Config) -> Result<PipelineResult> {
  let pipeline = config.validate().context("Invalid configuration")?;

  info!(
    input = %pipeline.input.display(),
    output = %pipeline.output.display(),
    workers = pipeline.workers,
    "Starting run"
  );

  run_pipeline(&pipeline)
    .await
    .with_context(|| format!("Failed to classify {}", pipeline.input.display()))
}

/// Exit code for a command line clap rejected. Help is not a failure.
fn usage_exit_code(err: &clap::Error) -> u8 {
  match err.kind() {
    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
    _ => EXIT_CONFIG,
  }
}

/// Map a failure to the process exit code.
fn exit_code(err: &anyhow::Error) -> u8 {
  if err.downcast_ref::<ConfigError>().is_some() {
    return EXIT_CONFIG;
  }

  match err.downcast_ref::<PipelineError>() {
    Some(PipelineError::Config(_)) => EXIT_CONFIG,
    Some(PipelineError::SourceNotFound { .. }) => EXIT_SOURCE_NOT_FOUND,
    Some(PipelineError::SinkUnopenable { .. }) => EXIT_SINK_UNOPENABLE,
    _ => EXIT_FAILURE,
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      // clap routes help to stdout and usage errors to stderr
      let _ = err.print();
      return ExitCode::from(usage_exit_code(&err));
    }
  };

  let config = match cli.load_config() {
    Ok(config) => config,
    Err(err) => {
      // Logging is not up yet
      eprintln!("Error: {err:#}");
      return ExitCode::from(exit_code(&err));
    }
  };

  let guard = init_logging(&config);

  match run(&config).await {
    Ok(result) => {
      info!(%result, "Run complete");
      ExitCode::SUCCESS
    }
    Err(err) => {
      error!("{err:#}");
      if guard.is_some() {
        eprintln!("Error: {err:#}");
      }
      ExitCode::from(exit_code(&err))
    }
  }
}
