use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::document::Chunk;

/// A retrieved chunk with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    /// Position of the chunk in its record.
    pub index: usize,
    pub text: String,
    pub score: f32,
}

/// Internal: a chunk that has been scored but not yet selected.
/// Borrows the chunk so text is only cloned for the passages kept.
#[derive(Debug, Clone)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

/// Read-only view of the store for health and debug callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub record_count: usize,
    pub handles: BTreeSet<String>,
    pub backend_ready: bool,
    pub encoder: String,
    pub snapshot_dirs: Vec<PathBuf>,
}
