//! Retrieval core for document question answering.
//!
//! `docqa-core` splits ingested text into overlapping chunks, fingerprints
//! each chunk with a deterministic hashing encoder, keeps the result in a
//! concurrent handle-addressed store with an optional on-disk fallback, and
//! ranks chunks against a question by cosine similarity. No model is called:
//! identical inputs always produce identical vectors and rankings.
//!
//! The application layer sees two operations, [`Engine::ingest`] and
//! [`Engine::retrieve`].

pub mod config;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod retrieval;
pub mod store;
pub mod types;

pub use config::{ConfigError, CoreConfig};
pub use engine::Engine;
pub use error::CoreError;
pub use types::{Deadline, Handle, ScoredPassage, StoreStatus};
