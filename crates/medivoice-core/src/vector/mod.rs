mod embedding;
mod index;

pub use embedding::{EmbeddingService, FastEmbedService, SUPPORTED_EMBEDDING_MODELS};
pub use index::{HnswIndex, SimilarityResult, VectorIndex};
