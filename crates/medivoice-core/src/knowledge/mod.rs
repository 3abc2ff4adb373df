//! Medical knowledge passages and similarity retrieval.
//!
//! Passages are embedded once at load time, persisted in redb, and served
//! from an in-memory HNSW index that is rebuilt from storage on open.

mod loader;
mod store;

pub use loader::{load_knowledge, SeedEntry};
pub use store::{KnowledgeStore, Retriever};
