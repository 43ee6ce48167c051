pub mod deadline;
pub mod identifiers;
pub mod retrieval;

pub use deadline::Deadline;
pub use identifiers::{ContentVersion, Handle};
pub use retrieval::{ScoredChunk, ScoredPassage, StoreStatus};
