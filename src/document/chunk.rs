use serde::{Deserialize, Serialize};

use super::chunker::Span;
use super::metadata::Metadata;

/// Contiguous piece of an ingested text. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub sequence_index: usize,
    pub text: String,
    pub source_metadata: Metadata,
}

impl Chunk {
    pub fn start_char(&self) -> Option<usize> {
        self.source_metadata
            .get_number("start_char")
            .and_then(|n| usize::try_from(n).ok())
    }

    pub fn end_char(&self) -> Option<usize> {
        self.source_metadata
            .get_number("end_char")
            .and_then(|n| usize::try_from(n).ok())
    }
}

/// Build chunks for `spans` of `text`, in span order.
///
/// Metadata keys: `source`, `start_char`, `end_char`, `line_from`, `line_to`.
/// Lines are 1-based.
pub fn build_chunks(text: &str, spans: &[Span], source: &str) -> Vec<Chunk> {
    // Spans start in non-decreasing order, so line numbers are tracked with
    // a cursor instead of rescanning from the top for every chunk.
    let mut cursor_byte = 0;
    let mut cursor_line = 1usize;

    spans
        .iter()
        .enumerate()
        .map(|(sequence_index, span)| {
            cursor_line += count_newlines(&text[cursor_byte..span.byte_start]);
            cursor_byte = span.byte_start;

            let piece = span.slice(text);
            let line_to = cursor_line + count_newlines(piece.trim_end_matches('\n'));

            let mut metadata = Metadata::new();
            metadata.insert_string("source", source);
            metadata.insert_number("start_char", to_i64(span.start));
            metadata.insert_number("end_char", to_i64(span.end));
            metadata.insert_number("line_from", to_i64(cursor_line));
            metadata.insert_number("line_to", to_i64(line_to));

            Chunk {
                sequence_index,
                text: piece.to_string(),
                source_metadata: metadata,
            }
        })
        .collect()
}

fn count_newlines(s: &str) -> usize {
    s.bytes().filter(|b| *b == b'\n').count()
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
