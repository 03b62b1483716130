//! Streaming Pipeline for Token Classification
//!
//! Three stages joined by two bounded queues:
//!
//! ```text
//! Producer → token queue → Classifier ×N → result queue → Writer
//!    1        input_cap         workers      output_cap      1
//! ```
//!
//! When a queue is full its upstream waits, so memory stays bounded no matter
//! how large the input is.
//!
//! ## Shutdown
//!
//! ```text
//! Running → ProducerDone → WorkersDone → WriterDone
//! ```
//!
//! The producer marks the token queue finished when it runs out of input.
//! Once it has exited the orchestrator queues one end marker per worker and
//! joins them all, then queues a single end marker for the writer and joins
//! it. A worker leaves on whichever it sees first: the drained token queue
//! or its end marker.
//!
//! Any fatal stage error ends the run at once. Every stage handle aborts its
//! task when dropped, so returning the error tears down whatever is still
//! running.

mod message;
mod producer;
mod worker;
mod writer;

use std::{fmt, io, path::PathBuf, sync::Arc};

use futures::future::try_join_all;
use seqscan_core::{ConfigError, PipelineConfig};
use tokio::task::JoinError;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, warn};

pub use self::{
  message::{TAG_SEPARATOR, TaggedResult},
  producer::{ProducerStats, feed_tokens, producer_stage},
  worker::{WorkerStats, classifier_worker},
  writer::{WriterStats, write_results, writer_stage},
};
use crate::queue::{BoundedQueue, QueueStats};

/// Global state of a run, in the order it is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PipelinePhase {
  #[default]
  Running,
  ProducerDone,
  WorkersDone,
  WriterDone,
}

impl fmt::Display for PipelinePhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      PipelinePhase::Running => "running",
      PipelinePhase::ProducerDone => "producer-done",
      PipelinePhase::WorkersDone => "workers-done",
      PipelinePhase::WriterDone => "writer-done",
    };
    f.write_str(name)
  }
}

/// Run the classification pipeline.
///
/// Creates both queues, starts the writer, `config.workers` classifier
/// workers and the producer, then walks the shutdown handshake to completion.
pub async fn run_pipeline(config: &PipelineConfig) -> Result<PipelineResult, PipelineError> {
  config.check()?;

  debug!(
    input = %config.input.display(),
    output = %config.output.display(),
    workers = config.workers,
    input_capacity = config.input_capacity,
    output_capacity = config.output_capacity,
    phase = %PipelinePhase::Running,
    "Starting classification pipeline"
  );

  let input = Arc::new(BoundedQueue::new(config.input_capacity));
  let output = Arc::new(BoundedQueue::new(config.output_capacity));

  let mut writer = AbortOnDropHandle::new(tokio::spawn(writer_stage(config.output.clone(), output.clone())));

  let workers: Vec<_> = (0..config.workers)
    .map(|worker_id| {
      AbortOnDropHandle::new(tokio::spawn(classifier_worker(
        worker_id,
        input.clone(),
        output.clone(),
      )))
    })
    .collect();

  let producer = AbortOnDropHandle::new(tokio::spawn(producer_stage(config.input.clone(), input.clone())));

  let (producer_stats, worker_stats) = tokio::select! {
    biased;

    finished = &mut writer => {
      // Before its end marker the writer only stops on failure
      finished??;
      warn!("Writer stage exited before the end of the run");
      return Err(PipelineError::StageExited { stage: "writer" });
    }

    upstream = shut_down_upstream(producer, workers, &input) => upstream?,
  };

  output.insert_end_marker();
  let writer_stats = writer.await??;
  debug!(
    phase = %PipelinePhase::WriterDone,
    results_written = writer_stats.results_written,
    "Writer finished"
  );

  let result = PipelineResult {
    tokens_read: producer_stats.tokens_read,
    results_classified: worker_stats.iter().map(|w| w.classified).sum(),
    matches: worker_stats.iter().map(|w| w.matched).sum(),
    results_written: writer_stats.results_written,
    workers: worker_stats,
    phase: PipelinePhase::WriterDone,
    input_queue: input.stats(),
    output_queue: output.stats(),
  };

  debug!(%result, "Pipeline complete");
  Ok(result)
}

/// Wait for the producer, release every worker, and join them.
async fn shut_down_upstream(
  producer: AbortOnDropHandle<Result<ProducerStats, PipelineError>>,
  workers: Vec<AbortOnDropHandle<WorkerStats>>,
  input: &BoundedQueue<String>,
) -> Result<(ProducerStats, Vec<WorkerStats>), PipelineError> {
  let producer_stats = producer.await??;
  debug!(
    phase = %PipelinePhase::ProducerDone,
    tokens_read = producer_stats.tokens_read,
    "Producer finished"
  );

  for _ in 0..workers.len() {
    input.insert_end_marker();
  }

  let worker_stats = try_join_all(workers).await?;
  debug!(
    phase = %PipelinePhase::WorkersDone,
    workers = worker_stats.len(),
    "All classifier workers finished"
  );

  Ok((producer_stats, worker_stats))
}

/// Result of running the pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineResult {
  pub tokens_read: usize,
  pub results_classified: usize,
  pub matches: usize,
  pub results_written: usize,
  pub workers: Vec<WorkerStats>,
  /// Last phase reached; `WriterDone` for any completed run
  pub phase: PipelinePhase,
  pub input_queue: QueueStats,
  pub output_queue: QueueStats,
}

impl fmt::Display for PipelineResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Read: {}, Classified: {}, Matched: {}, Written: {}, Workers: {}",
      self.tokens_read,
      self.results_classified,
      self.matches,
      self.results_written,
      self.workers.len()
    )
  }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
  #[error("invalid configuration: {0}")]
  Config(#[from] ConfigError),
  #[error("input file {} does not exist or cannot be opened", .path.display())]
  SourceNotFound {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("output file {} cannot be opened", .path.display())]
  SinkUnopenable {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("IO error: {0}")]
  Io(#[from] io::Error),
  #[error("stage task failed: {0}")]
  Task(#[from] JoinError),
  #[error("{stage} stage exited before the end of the run")]
  StageExited { stage: &'static str },
}
