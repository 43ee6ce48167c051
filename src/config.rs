use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::chunker::{Chunker, ChunkerError, DEFAULT_MAX_SIZE, DEFAULT_OVERLAP};
use crate::embedding::encoder::DEFAULT_DIMENSION;

pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid chunking parameters: {0}")]
    Chunking(#[from] ChunkerError),
    #[error("Embedding dimension must be greater than zero")]
    ZeroDimension,
    #[error("top_k must be greater than zero")]
    ZeroTopK,
    #[error("{var} environment variable is not set")]
    MissingCredential { var: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

// Every section defaults independently, so a config file only needs the
// keys it changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub chunking: ChunkingConfig,
    pub encoder: EncoderConfig,
    pub retrieval: RetrievalConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    pub fn chunker(&self) -> Result<Chunker, ChunkerError> {
        Chunker::new(self.max_size, self.overlap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderKind {
    #[default]
    Lexical,
    PositionalChar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub kind: EncoderKind,
    pub dimension: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            kind: EncoderKind::default(),
            dimension: DEFAULT_DIMENSION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Durable fallback directories, consulted in order on a memory miss.
    /// Snapshots are written to the first one. Empty means memory only.
    pub snapshot_dirs: Vec<PathBuf>,
    /// When set, ingest refuses to run unless this variable is non-empty.
    pub credential_env: Option<String>,
    /// Records older than this are dropped on lookup and by `purge_expired`.
    pub max_age_secs: Option<u64>,
}

impl CoreConfig {
    pub fn v0() -> Self {
        Self::default()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chunking.chunker()?;
        if self.encoder.dimension == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = CoreConfig::v0();
        assert_eq!(config.chunking.max_size, 1000);
        assert_eq!(config.chunking.overlap, 200);
        assert_eq!(config.encoder.kind, EncoderKind::Lexical);
        assert_eq!(config.encoder.dimension, 384);
        assert_eq!(config.retrieval.top_k, 3);
        assert!(config.store.snapshot_dirs.is_empty());
        assert!(config.store.credential_env.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = CoreConfig::from_toml_str(
            r#"
            [chunking]
            max_size = 500

            [encoder]
            kind = "positional_char"

            [store]
            snapshot_dirs = ["/tmp/vector-stores", "/tmp/document-stores"]
            credential_env = "GROQ_API_KEY"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.max_size, 500);
        assert_eq!(config.chunking.overlap, 200);
        assert_eq!(config.encoder.kind, EncoderKind::PositionalChar);
        assert_eq!(config.encoder.dimension, 384);
        assert_eq!(config.store.snapshot_dirs.len(), 2);
        assert_eq!(config.store.credential_env.as_deref(), Some("GROQ_API_KEY"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = CoreConfig::from_toml_str("[chunking]\nmax_size = 100\noverlap = 100\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Chunking(ChunkerError::OverlapTooLarge { overlap: 100, max_size: 100 })
        ));

        let err = CoreConfig::from_toml_str("[retrieval]\ntop_k = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTopK));

        let err = CoreConfig::from_toml_str("[encoder]\ndimension = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroDimension));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = CoreConfig::from_toml_str("[encoder]\nkind = \"semantic\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
