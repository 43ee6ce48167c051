pub mod ranking;
pub mod top_k;

use std::sync::Arc;

use tracing::debug;

use crate::config::ConfigError;
use crate::error::CoreError;
use crate::store::{Record, Store};
use crate::types::deadline::Deadline;
use crate::types::retrieval::{ScoredChunk, ScoredPassage};

pub use ranking::{cosine_similarity, CosineSimilarity, SimilarityScorer};
pub use top_k::{apply_top_k, rank};

/// Ranks the chunks of a stored record against a question.
///
/// Pure reads: any number of queries may run against the same record at
/// once.
pub struct Retriever<S = CosineSimilarity> {
    store: Arc<Store>,
    scorer: S,
}

impl Retriever<CosineSimilarity> {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            scorer: CosineSimilarity,
        }
    }
}

impl<S> Retriever<S>
where
    S: SimilarityScorer,
{
    pub fn with_scorer(store: Arc<Store>, scorer: S) -> Self {
        Self { store, scorer }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Texts of the `top_k` chunks most similar to `question`, best first.
    pub fn query(&self, handle: &str, question: &str, top_k: usize) -> Result<Vec<String>, CoreError> {
        Ok(self
            .query_scored(handle, question, top_k)?
            .into_iter()
            .map(|p| p.text)
            .collect())
    }

    /// As [`Retriever::query`], keeping each passage's index and score.
    pub fn query_scored(
        &self,
        handle: &str,
        question: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredPassage>, CoreError> {
        self.query_scored_within(handle, question, top_k, Deadline::unbounded())
    }

    /// As [`Retriever::query_scored`], giving up between lookup and ranking
    /// once `deadline` passes.
    pub fn query_scored_within(
        &self,
        handle: &str,
        question: &str,
        top_k: usize,
        deadline: Deadline,
    ) -> Result<Vec<ScoredPassage>, CoreError> {
        if top_k == 0 {
            return Err(ConfigError::ZeroTopK.into());
        }
        let record = self.store.lookup_within(handle, deadline)?;
        deadline.check("ranking")?;
        let passages = self.rank_record(&record, question, top_k);
        debug!(
            handle,
            considered = record.len(),
            returned = passages.len(),
            best = passages.first().map(|p| p.score),
            "Query ranked"
        );
        Ok(passages)
    }

    /// Score every chunk of `record` and keep the best `top_k`.
    pub fn rank_record(&self, record: &Record, question: &str, top_k: usize) -> Vec<ScoredPassage> {
        let query = self.store.encoder().encode(question);

        let mut scored: Vec<ScoredChunk> = record
            .entries()
            .map(|(chunk, vector)| ScoredChunk {
                chunk,
                score: self.scorer.similarity(&query, vector),
            })
            .collect();

        rank(&mut scored);
        apply_top_k(scored, top_k)
    }
}
