//! Messages passed between pipeline stages.
//!
//! ```text
//! Producer ──String──▶ Workers ──TaggedResult──▶ Writer
//! ```
//!
//! Both queues carry [`Message`](crate::queue::Message)s, so either side can
//! also see an end marker.

use std::fmt;

use seqscan_core::{Tag, classify};

/// Separator between a token and its tag in the output.
pub const TAG_SEPARATOR: char = ' ';

/// A token together with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedResult {
  pub token: String,
  pub tag: Tag,
}

impl TaggedResult {
  pub fn new(token: String, tag: Tag) -> Self {
    Self { token, tag }
  }

  /// Classify `token` and wrap the outcome.
  pub fn classify(token: String) -> Self {
    let tag = classify(&token);
    Self { token, tag }
  }
}

impl fmt::Display for TaggedResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}{}", self.token, TAG_SEPARATOR, self.tag)
  }
}
