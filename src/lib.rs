// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod config;
pub mod error;
pub mod ingest;
pub mod notify;
pub mod pipeline;

// ---- Re-exports for stable public API ----
pub use crate::analyze::insights::{Draft, Insight};
pub use crate::error::{ConfigError, DeliveryError, ExtractionError, FetchError, PipelineError};
pub use crate::ingest::types::{Platform, Post, Source, SourceEntry};
pub use crate::pipeline::{Pipeline, RunOutcome};
