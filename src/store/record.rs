use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::document::Chunk;
use crate::embedding::{Embedding, Encoder};
use crate::types::identifiers::{ContentVersion, Handle};

/// One ingested text: its chunks and their vectors, in text order.
///
/// A record is never mutated after construction; readers share it through
/// `Arc`.
///
/// `chunks` and `vectors` are parallel and never empty; `vectors[i]` is the
/// encoding of `chunks[i].text` under the encoder named by `encoder`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    handle: Handle,
    version: ContentVersion,
    source_label: String,
    original_text: String,
    chunks: Vec<Chunk>,
    vectors: Vec<Embedding>,
    encoder: String,
    created_at: DateTime<Utc>,
}

impl Record {
    /// Encode every chunk and assemble the record.
    ///
    /// Returns `None` when there are no chunks.
    pub fn build(
        handle: Handle,
        original_text: String,
        source_label: String,
        chunks: Vec<Chunk>,
        encoder: &dyn Encoder,
        created_at: DateTime<Utc>,
    ) -> Option<Self> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = encoder.encode_all(&texts);
        Self::from_parts(handle, original_text, source_label, chunks, vectors, encoder.id(), created_at)
    }

    /// Assemble from already computed vectors. Rejects mismatched or empty
    /// inputs.
    pub(crate) fn from_parts(
        handle: Handle,
        original_text: String,
        source_label: String,
        chunks: Vec<Chunk>,
        vectors: Vec<Embedding>,
        encoder: &str,
        created_at: DateTime<Utc>,
    ) -> Option<Self> {
        if chunks.is_empty() || chunks.len() != vectors.len() {
            return None;
        }
        Some(Record {
            handle,
            version: ContentVersion::from_content(original_text.as_bytes()),
            source_label,
            original_text,
            chunks,
            vectors,
            encoder: encoder.to_string(),
            created_at,
        })
    }

    pub(crate) fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = handle;
        self
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn version(&self) -> &ContentVersion {
        &self.version
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn vectors(&self) -> &[Embedding] {
        &self.vectors
    }

    pub fn encoder(&self) -> &str {
        &self.encoder
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Always false for a constructed record.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunks paired with their vectors.
    pub fn entries(&self) -> impl Iterator<Item = (&Chunk, &Embedding)> {
        self.chunks.iter().zip(self.vectors.iter())
    }
}
