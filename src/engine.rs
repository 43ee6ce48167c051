use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigError, CoreConfig, DEFAULT_TOP_K};
use crate::error::CoreError;
use crate::retrieval::{CosineSimilarity, Retriever, SimilarityScorer};
use crate::store::Store;
use crate::types::deadline::Deadline;
use crate::types::identifiers::Handle;
use crate::types::retrieval::{ScoredPassage, StoreStatus};

/// The two operations the application layer calls, plus status.
///
/// Text extraction happens before `ingest`; the language-model call happens
/// after `retrieve`, with the returned passages as context.
pub struct Engine<S = CosineSimilarity> {
    retriever: Retriever<S>,
    default_top_k: usize,
}

impl Engine<CosineSimilarity> {
    pub fn from_config(config: &CoreConfig) -> Result<Self, ConfigError> {
        let store = Arc::new(Store::from_config(config)?);
        Ok(Self {
            retriever: Retriever::new(store),
            default_top_k: config.retrieval.top_k,
        })
    }

    pub fn new(store: Arc<Store>) -> Self {
        Self::with_retriever(Retriever::new(store))
    }
}

impl<S> Engine<S>
where
    S: SimilarityScorer,
{
    pub fn with_retriever(retriever: Retriever<S>) -> Self {
        Self {
            retriever,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        self.retriever.store()
    }

    /// Store `text` and return the handle that addresses it.
    pub fn ingest(&self, text: &str, label: &str) -> Result<Handle, CoreError> {
        self.store().create(text, label)
    }

    /// As [`Engine::ingest`], failing with `TimedOut` if `timeout` elapses
    /// before the record is stored.
    pub fn ingest_within(&self, text: &str, label: &str, timeout: Duration) -> Result<Handle, CoreError> {
        self.store().create_within(text, label, Deadline::after(timeout))
    }

    pub fn retrieve(&self, handle: &str, question: &str, top_k: usize) -> Result<Vec<String>, CoreError> {
        self.retriever.query(handle, question, top_k)
    }

    /// Retrieve with the configured `retrieval.top_k`.
    pub fn retrieve_default(&self, handle: &str, question: &str) -> Result<Vec<String>, CoreError> {
        self.retrieve(handle, question, self.default_top_k)
    }

    pub fn retrieve_scored(
        &self,
        handle: &str,
        question: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredPassage>, CoreError> {
        self.retriever.query_scored(handle, question, top_k)
    }

    pub fn retrieve_within(
        &self,
        handle: &str,
        question: &str,
        top_k: usize,
        timeout: Duration,
    ) -> Result<Vec<String>, CoreError> {
        Ok(self
            .retriever
            .query_scored_within(handle, question, top_k, Deadline::after(timeout))?
            .into_iter()
            .map(|p| p.text)
            .collect())
    }

    pub fn status(&self) -> StoreStatus {
        self.store().status()
    }
}
