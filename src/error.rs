use thiserror::Error;

use crate::config::ConfigError;
use crate::document::chunker::ChunkerError;

/// Errors surfaced to callers of the core.
///
/// Durable-tier I/O failures never appear here: they are logged and
/// degrade to `NotFound` (on lookup) or are ignored (on create).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Missing credential or invalid parameter. Retrying without fixing the
    /// configuration gives the same result.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The input cannot be ingested as given.
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// Unknown or expired handle. Recovery is to ingest the text again.
    #[error("Document {0} not found. Please upload your document again.")]
    NotFound(String),

    /// The caller's time limit passed before `stage` could start. Nothing
    /// was stored.
    #[error("Timed out before {stage} ({limit_ms} ms limit)")]
    TimedOut { stage: &'static str, limit_ms: u64 },
}

impl From<ChunkerError> for CoreError {
    fn from(e: ChunkerError) -> Self {
        CoreError::Configuration(ConfigError::Chunking(e))
    }
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound(_))
    }
}
