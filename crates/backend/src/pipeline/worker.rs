//! Classifier stage - tags each token and forwards it to the writer.

use std::sync::Arc;

use tracing::trace;

use super::message::TaggedResult;
use crate::queue::{BoundedQueue, Message};

/// Stats returned by one classifier worker
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
  pub worker_id: usize,
  /// Tokens classified and forwarded
  pub classified: usize,
  /// How many of those matched the pattern
  pub matched: usize,
}

/// Classifier worker.
///
/// Multiple workers run in parallel, all pulling from the same token queue.
/// A worker stops as soon as it either sees the token queue drained or
/// receives an end marker; the marker itself is neither classified nor
/// forwarded. Results from different workers interleave freely.
pub async fn classifier_worker(
  worker_id: usize,
  input: Arc<BoundedQueue<String>>,
  output: Arc<BoundedQueue<TaggedResult>>,
) -> WorkerStats {
  trace!(worker_id, "Classifier worker starting");
  let mut stats = WorkerStats {
    worker_id,
    ..Default::default()
  };

  while !input.is_drained() {
    let token = match input.remove().await {
      Message::Item(token) => token,
      Message::End => {
        trace!(worker_id, processed = stats.classified, "Classifier worker: end marker");
        break;
      }
    };

    let result = TaggedResult::classify(token);
    if result.tag.is_match() {
      stats.matched += 1;
    }

    output.insert(result).await;
    stats.classified += 1;
  }

  trace!(
    worker_id,
    processed = stats.classified,
    matched = stats.matched,
    "Classifier worker finished"
  );
  stats
}
