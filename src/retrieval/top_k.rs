use std::cmp::Ordering;

use crate::types::retrieval::{ScoredChunk, ScoredPassage};

/// Sort by (score desc, sequence_index asc).
pub fn rank(scored: &mut [ScoredChunk<'_>]) {
    scored.sort_by(|a, b| {
        // Descending score
        let score_cmp = b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal);
        if score_cmp != Ordering::Equal {
            score_cmp
        } else {
            // Ascending position in the text
            a.chunk.sequence_index.cmp(&b.chunk.sequence_index)
        }
    });

    debug_assert!(scored.windows(2).all(|w| {
        let a = &w[0];
        let b = &w[1];
        a.score > b.score
            || (a.score == b.score && a.chunk.sequence_index <= b.chunk.sequence_index)
            || a.score.is_nan()
            || b.score.is_nan()
    }));
}

/// Keep the first `top_k` of an already ranked list. Asking for more than
/// there are returns everything.
pub fn apply_top_k(ranked: Vec<ScoredChunk<'_>>, top_k: usize) -> Vec<ScoredPassage> {
    ranked
        .into_iter()
        .take(top_k)
        .map(|sc| ScoredPassage {
            index: sc.chunk.sequence_index,
            text: sc.chunk.text.clone(),
            score: sc.score,
        })
        .collect()
}
