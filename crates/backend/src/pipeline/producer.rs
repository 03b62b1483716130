//! Producer stage - reads tokens from the input file into the token queue.

use std::{
  io,
  path::{Path, PathBuf},
  sync::Arc,
};

use tokio::{
  fs::File,
  io::{AsyncBufRead, AsyncBufReadExt, BufReader},
};
use tracing::debug;

use super::PipelineError;
use crate::queue::BoundedQueue;

/// Stats returned by the producer stage
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProducerStats {
  pub tokens_read: usize,
}

/// Producer stage - the single task feeding the token queue.
///
/// The source is checked once, before anything is read. Every
/// whitespace-separated token is inserted in file order, then the queue is
/// marked finished. The producer never inserts an end marker.
pub async fn producer_stage(source: PathBuf, queue: Arc<BoundedQueue<String>>) -> Result<ProducerStats, PipelineError> {
  debug!(source = %source.display(), "Producer stage starting");

  let file = open_source(&source).await?;
  let stats = feed_tokens(BufReader::new(file), &queue).await?;

  debug!(tokens_read = stats.tokens_read, "Producer stage complete");
  Ok(stats)
}

async fn open_source(path: &Path) -> Result<File, PipelineError> {
  let not_found = |source: io::Error| PipelineError::SourceNotFound {
    path: path.to_path_buf(),
    source,
  };

  let metadata = tokio::fs::metadata(path).await.map_err(not_found)?;
  if metadata.is_dir() {
    return Err(not_found(io::Error::other("is a directory")));
  }

  File::open(path).await.map_err(not_found)
}

/// Insert every token read from `reader`, then mark the queue finished.
///
/// Tokens are cut straight from the buffered byte stream: each one is queued
/// as soon as the whitespace after it is read, so only the token being built
/// is held, never a whole line. Runs of whitespace produce no tokens.
pub async fn feed_tokens<R>(mut reader: R, queue: &BoundedQueue<String>) -> Result<ProducerStats, PipelineError>
where
  R: AsyncBufRead + Unpin,
{
  let mut token = Vec::new();
  let mut tokens_read = 0;

  loop {
    let (used, complete) = {
      let buf = reader.fill_buf().await?;
      if buf.is_empty() {
        break;
      }

      match buf.iter().position(is_separator) {
        Some(end) => {
          token.extend_from_slice(&buf[..end]);
          (end + 1, true)
        }
        None => {
          token.extend_from_slice(buf);
          (buf.len(), false)
        }
      }
    };
    reader.consume(used);

    if complete && !token.is_empty() {
      queue.insert(take_token(&mut token)?).await;
      tokens_read += 1;
    }
  }

  // last token, when the source does not end in whitespace
  if !token.is_empty() {
    queue.insert(take_token(&mut token)?).await;
    tokens_read += 1;
  }

  queue.mark_finished();

  Ok(ProducerStats { tokens_read })
}

/// ASCII whitespace plus vertical tab.
fn is_separator(byte: &u8) -> bool {
  byte.is_ascii_whitespace() || *byte == 0x0b
}

fn take_token(token: &mut Vec<u8>) -> io::Result<String> {
  String::from_utf8(std::mem::take(token)).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}
