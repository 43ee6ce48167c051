pub mod chunk;
pub mod chunker;
pub mod metadata;

pub use chunk::Chunk;
pub use chunker::{Chunker, ChunkerError, Span};
pub use metadata::{Metadata, MetadataValue};
