//! Writer stage - drains tagged results into the output file.

use std::{path::PathBuf, sync::Arc};

use tokio::{
  fs::File,
  io::{AsyncWrite, AsyncWriteExt, BufWriter},
};
use tracing::debug;

use super::{PipelineError, message::TaggedResult};
use crate::queue::{BoundedQueue, Message};

/// Written between consecutive results; never before the first or after the last.
const RECORD_SEPARATOR: &[u8] = b"\n";

/// Stats returned by the writer stage
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriterStats {
  pub results_written: usize,
}

/// Writer stage - the single task draining the result queue.
///
/// The sink is created (or truncated) once, before the loop. The stage only
/// returns successfully after receiving its end marker.
pub async fn writer_stage(sink: PathBuf, queue: Arc<BoundedQueue<TaggedResult>>) -> Result<WriterStats, PipelineError> {
  debug!(sink = %sink.display(), "Writer stage starting");

  let file = File::create(&sink)
    .await
    .map_err(|source| PipelineError::SinkUnopenable {
      path: sink.clone(),
      source,
    })?;

  let mut out = BufWriter::new(file);
  let stats = write_results(&mut out, &queue).await?;

  debug!(results_written = stats.results_written, "Writer stage complete");
  Ok(stats)
}

/// Write results until the end marker arrives, then flush and close `sink`.
pub async fn write_results<W>(sink: &mut W, queue: &BoundedQueue<TaggedResult>) -> Result<WriterStats, PipelineError>
where
  W: AsyncWrite + Unpin,
{
  let mut results_written = 0;

  loop {
    match queue.remove().await {
      Message::Item(result) => {
        if results_written > 0 {
          sink.write_all(RECORD_SEPARATOR).await?;
        }
        sink.write_all(result.to_string().as_bytes()).await?;
        results_written += 1;
      }
      Message::End => break,
    }
  }

  sink.flush().await?;
  sink.shutdown().await?;

  Ok(WriterStats { results_written })
}
