//! Test helpers for pipeline integration tests.
//!
//! Provides `PipelineTestContext`, which owns a temporary directory holding the
//! input and output files of a run.

use std::{path::PathBuf, time::Duration};

use seqscan_core::PipelineConfig;
use tempfile::TempDir;

use crate::pipeline::{PipelineError, PipelineResult, run_pipeline};

/// Upper bound for any run in these tests; hitting it means a deadlock.
pub const RUN_DEADLINE: Duration = Duration::from_secs(10);

pub struct PipelineTestContext {
  /// Holds `input.txt` and `output.txt`
  pub dir: TempDir,
}

impl PipelineTestContext {
  pub fn new() -> Self {
    Self {
      dir: TempDir::new().expect("create temp dir"),
    }
  }

  pub fn input_path(&self) -> PathBuf {
    self.dir.path().join("input.txt")
  }

  pub fn output_path(&self) -> PathBuf {
    self.dir.path().join("output.txt")
  }

  /// Write the input file.
  pub async fn write_input(&self, content: &str) {
    tokio::fs::write(self.input_path(), content).await.expect("write input");
  }

  /// A run over this context's files.
  pub fn config(&self, workers: usize, input_capacity: usize, output_capacity: usize) -> PipelineConfig {
    PipelineConfig::new(self.input_path(), self.output_path(), workers).with_capacities(input_capacity, output_capacity)
  }

  /// Run the pipeline, failing the test if it does not finish in time.
  pub async fn run(&self, config: &PipelineConfig) -> Result<PipelineResult, PipelineError> {
    tokio::time::timeout(RUN_DEADLINE, run_pipeline(config))
      .await
      .expect("pipeline did not terminate")
  }

  /// Raw output file contents.
  pub async fn read_output(&self) -> String {
    tokio::fs::read_to_string(self.output_path()).await.expect("read output")
  }

  /// Output records sorted, since worker interleaving makes file order arbitrary.
  pub async fn sorted_output(&self) -> Vec<String> {
    let content = self.read_output().await;
    let mut lines: Vec<String> = content.split('\n').filter(|l| !l.is_empty()).map(String::from).collect();
    lines.sort();
    lines
  }
}

/// Deterministic token soup over ACGT plus the occasional foreign symbol.
pub fn generate_tokens(count: usize, seed: u64) -> Vec<String> {
  const SYMBOLS: &[u8] = b"ACGTACGTACGTN";
  let mut state = seed;
  let mut next = || {
    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (state >> 33) as usize
  };

  (0..count)
    .map(|_| {
      let len = 1 + next() % 12;
      (0..len).map(|_| SYMBOLS[next() % SYMBOLS.len()] as char).collect()
    })
    .collect()
}
