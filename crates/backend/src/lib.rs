//! seqscan - concurrent pattern scanning over nucleotide tokens
//!
//! Reads whitespace-separated tokens from a text file, tags each one with
//! whether it contains a `G T+ C` run, and writes the tagged tokens to an
//! output file. See [`pipeline`] for the stage layout and shutdown protocol
//! and [`queue`] for the bounded queue that connects the stages.

pub mod pipeline;
pub mod queue;


pub use pipeline::{PipelineError, PipelinePhase, PipelineResult, TaggedResult, run_pipeline};
pub use queue::{BoundedQueue, Message, QueueStats};
pub use seqscan_core::{Config, ConfigError, PipelineConfig, Tag, classify};
