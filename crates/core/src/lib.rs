//! Shared building blocks for seqscan: run configuration and the token classifier.

pub mod classifier;
pub mod config;

pub use classifier::{Tag, classify};
pub use config::{Config, ConfigError, LoggingConfig, PipelineConfig, PipelineSettings};
