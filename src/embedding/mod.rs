pub mod encoder;
pub mod vector;

use std::sync::Arc;

use crate::config::{EncoderConfig, EncoderKind};

pub use encoder::{Encoder, LexicalHashEncoder, PositionalCharEncoder, DEFAULT_DIMENSION};
pub use vector::Embedding;

/// Instantiate the configured encoding strategy.
pub fn encoder_for(config: &EncoderConfig) -> Arc<dyn Encoder> {
    match config.kind {
        EncoderKind::Lexical => Arc::new(LexicalHashEncoder::new(config.dimension)),
        EncoderKind::PositionalChar => Arc::new(PositionalCharEncoder::new(config.dimension)),
    }
}
