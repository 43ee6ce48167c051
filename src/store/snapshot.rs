use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::document::{Chunk, Metadata};
use crate::embedding::{Embedding, Encoder};
use crate::store::record::Record;
use crate::types::identifiers::{ContentVersion, Handle};

/// Failures of the durable tier. These never leave the store: it logs them
/// and treats the record as absent.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Snapshot {file} belongs to handle {found}")]
    HandleMismatch { file: PathBuf, found: String },
    #[error("Snapshot version mismatch for {handle}: file says {stored}, text hashes to {actual}")]
    VersionMismatch {
        handle: String,
        stored: String,
        actual: String,
    },
    #[error("Snapshot for {0} has no chunks")]
    Empty(String),
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    handle: &'a Handle,
    version: &'a ContentVersion,
    source_label: &'a str,
    text: &'a str,
    encoder: &'a str,
    created_at: DateTime<Utc>,
    chunks: Vec<ChunkOut<'a>>,
}

#[derive(Serialize)]
struct ChunkOut<'a> {
    sequence_index: usize,
    text: &'a str,
    metadata: &'a Metadata,
    embedding: &'a Embedding,
}

// Readers accept the older layout too: camelCase keys, `id`/`content` for
// chunks, no handle, version or encoder, and chunks without embeddings.
#[derive(Deserialize)]
struct SnapshotIn {
    #[serde(default)]
    handle: Option<Handle>,
    #[serde(default)]
    version: Option<ContentVersion>,
    #[serde(default, alias = "documentId")]
    source_label: String,
    text: String,
    #[serde(default)]
    encoder: Option<String>,
    #[serde(alias = "createdAt")]
    created_at: DateTime<Utc>,
    chunks: Vec<ChunkIn>,
}

#[derive(Deserialize)]
struct ChunkIn {
    #[serde(alias = "id")]
    sequence_index: usize,
    #[serde(alias = "content")]
    text: String,
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

/// On-disk fallback: one `<handle>.json` file per record.
///
/// Reads try each directory in order; writes go to the first.
#[derive(Debug, Clone, Default)]
pub struct SnapshotTier {
    dirs: Vec<PathBuf>,
}

impl SnapshotTier {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        !self.dirs.is_empty()
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Write `record` to the primary directory via temp file and rename, so a
    /// reader never sees a half-written snapshot.
    pub fn write(&self, record: &Record) -> Result<(), SnapshotError> {
        let Some(dir) = self.dirs.first() else {
            return Ok(());
        };
        fs::create_dir_all(dir)?;

        let snapshot = SnapshotOut {
            handle: record.handle(),
            version: record.version(),
            source_label: record.source_label(),
            text: record.original_text(),
            encoder: record.encoder(),
            created_at: record.created_at(),
            chunks: record
                .entries()
                .map(|(chunk, vector)| ChunkOut {
                    sequence_index: chunk.sequence_index,
                    text: &chunk.text,
                    metadata: &chunk.source_metadata,
                    embedding: vector,
                })
                .collect(),
        };

        let final_path = snapshot_path(dir, record.handle());
        let temp_path = final_path.with_extension("json.tmp");

        let written = write_synced(&temp_path, &snapshot)
            .and_then(|()| fs::rename(&temp_path, &final_path).map_err(SnapshotError::from));
        if written.is_err() {
            // best effort
            let _ = fs::remove_file(&temp_path);
        }
        written
    }

    /// Load the snapshot for `handle`, if any directory has one.
    ///
    /// Vectors missing from the file, or produced by a different encoder, are
    /// recomputed with `encoder`.
    pub fn read(&self, handle: &Handle, encoder: &dyn Encoder) -> Result<Option<Record>, SnapshotError> {
        for dir in &self.dirs {
            let path = snapshot_path(dir, handle);
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let snapshot: SnapshotIn = serde_json::from_slice(&bytes)?;
            return restore(handle, &path, snapshot, encoder).map(Some);
        }
        Ok(None)
    }

    pub fn remove(&self, handle: &Handle) -> Result<bool, SnapshotError> {
        let mut removed = false;
        for dir in &self.dirs {
            match fs::remove_file(snapshot_path(dir, handle)) {
                Ok(()) => removed = true,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }
}

fn snapshot_path(dir: &Path, handle: &Handle) -> PathBuf {
    dir.join(format!("{}.json", handle.as_str()))
}

fn restore(
    handle: &Handle,
    path: &Path,
    snapshot: SnapshotIn,
    encoder: &dyn Encoder,
) -> Result<Record, SnapshotError> {
    if let Some(found) = &snapshot.handle {
        if found != handle {
            return Err(SnapshotError::HandleMismatch {
                file: path.to_path_buf(),
                found: found.as_str().to_string(),
            });
        }
    }

    let actual = ContentVersion::from_content(snapshot.text.as_bytes());
    if let Some(stored) = &snapshot.version {
        if *stored != actual {
            return Err(SnapshotError::VersionMismatch {
                handle: handle.as_str().to_string(),
                stored: stored.as_str().to_string(),
                actual: actual.as_str().to_string(),
            });
        }
    }

    let same_encoder = snapshot.encoder.as_deref() == Some(encoder.id());
    let mut reencoded = 0usize;
    let mut chunks = Vec::with_capacity(snapshot.chunks.len());
    let mut vectors = Vec::with_capacity(snapshot.chunks.len());

    for stored in snapshot.chunks {
        let vector = match stored.embedding {
            Some(values) if same_encoder && values.len() == encoder.dimension() => Embedding::from_raw(values),
            _ => {
                reencoded += 1;
                encoder.encode(&stored.text)
            }
        };
        chunks.push(Chunk {
            sequence_index: stored.sequence_index,
            text: stored.text,
            source_metadata: stored.metadata,
        });
        vectors.push(vector);
    }

    if reencoded > 0 {
        debug!(handle = %handle, reencoded, encoder = encoder.id(), "Recomputed snapshot vectors");
    }

    Record::from_parts(
        handle.clone(),
        snapshot.text,
        snapshot.source_label,
        chunks,
        vectors,
        encoder.id(),
        snapshot.created_at,
    )
    .ok_or_else(|| SnapshotError::Empty(handle.as_str().to_string()))
}

fn write_synced(path: &Path, snapshot: &SnapshotOut<'_>) -> Result<(), SnapshotError> {
    let mut f = fs::File::create(path)?;
    serde_json::to_writer_pretty(&f, snapshot)?;
    f.flush()?;
    f.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::chunk::build_chunks;
    use crate::document::chunker::Chunker;
    use crate::embedding::LexicalHashEncoder;
    use tempfile::tempdir;

    fn sample_record(encoder: &dyn Encoder) -> Record {
        let text = "Clause one grants access. Clause two limits liability. Clause three ends it.";
        let spans = Chunker::new(30, 5).unwrap().spans(text);
        let chunks = build_chunks(text, &spans, "contract.txt");
        Record::build(
            Handle::generate(),
            text.to_string(),
            "contract.txt".to_string(),
            chunks,
            encoder,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn write_then_read_restores_identical_record() {
        let dir = tempdir().unwrap();
        let tier = SnapshotTier::new(vec![dir.path().join("vector-stores")]);
        let encoder = LexicalHashEncoder::default();
        let record = sample_record(&encoder);

        tier.write(&record).unwrap();
        let restored = tier.read(record.handle(), &encoder).unwrap().unwrap();

        assert_eq!(restored, record);
        assert!(!dir
            .path()
            .join("vector-stores")
            .join(format!("{}.json.tmp", record.handle()))
            .exists());
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let tier = SnapshotTier::new(vec![dir.path().to_path_buf()]);
        let encoder = LexicalHashEncoder::default();
        let record = sample_record(&encoder);

        // a non-empty directory where the snapshot should land makes the rename fail
        let blocker = dir.path().join(format!("{}.json", record.handle()));
        fs::create_dir_all(blocker.join("occupied")).unwrap();

        assert!(tier.write(&record).is_err());
        assert!(!dir
            .path()
            .join(format!("{}.json.tmp", record.handle()))
            .exists());
        assert!(blocker.is_dir());
    }

    #[test]
    fn missing_snapshot_is_none() {
        let dir = tempdir().unwrap();
        let tier = SnapshotTier::new(vec![dir.path().to_path_buf()]);
        let encoder = LexicalHashEncoder::default();
        assert!(tier.read(&Handle::generate(), &encoder).unwrap().is_none());
    }

    #[test]
    fn tampered_text_is_rejected() {
        let dir = tempdir().unwrap();
        let tier = SnapshotTier::new(vec![dir.path().to_path_buf()]);
        let encoder = LexicalHashEncoder::default();
        let record = sample_record(&encoder);
        tier.write(&record).unwrap();

        let path = dir.path().join(format!("{}.json", record.handle()));
        let raw = fs::read_to_string(&path).unwrap();
        fs::write(&path, raw.replace("Clause one grants", "Clause one denies")).unwrap();

        let err = tier.read(record.handle(), &encoder).unwrap_err();
        assert!(matches!(err, SnapshotError::VersionMismatch { .. }));
    }

    #[test]
    fn disabled_tier_writes_nothing() {
        let tier = SnapshotTier::disabled();
        let encoder = LexicalHashEncoder::default();
        assert!(!tier.is_enabled());
        tier.write(&sample_record(&encoder)).unwrap();
        assert!(tier.read(&Handle::generate(), &encoder).unwrap().is_none());
    }
}
