use crate::error::{MediVoiceError, Result};
use crate::storage::Storage;
use crate::types::{DocumentId, KnowledgeDocument};
use crate::vector::{EmbeddingService, HnswIndex, VectorIndex};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Context lookup used by the conversation pipeline.
///
/// Never fails: an empty store or any lookup error yields an empty string,
/// which the prompt builder treats as "no context".
pub trait Retriever: Send + Sync {
    fn search(&self, query: &str, k: usize) -> String;
}

/// Documents and the index that ranks them, kept in step under one lock.
struct Indexed {
    index: HnswIndex,
    documents: HashMap<DocumentId, KnowledgeDocument>,
}

/// Similarity search over indexed knowledge passages
pub struct KnowledgeStore {
    storage: Arc<dyn Storage>,
    embeddings: Arc<dyn EmbeddingService>,
    inner: RwLock<Indexed>,
}

impl KnowledgeStore {
    /// Open the store, rebuilding the in-memory index from persisted documents.
    pub fn open(storage: Arc<dyn Storage>, embeddings: Arc<dyn EmbeddingService>) -> Result<Self> {
        let mut index = HnswIndex::new(embeddings.dimension());
        let mut documents = HashMap::new();

        for doc in storage.list_documents()? {
            if doc.embedding.len() != index.dimension() {
                log::warn!(
                    "Skipping knowledge document {} with dimension {} (model expects {})",
                    doc.id,
                    doc.embedding.len(),
                    index.dimension()
                );
                continue;
            }
            index.insert(doc.id, &doc.embedding)?;
            documents.insert(doc.id, doc);
        }
        index.rebuild()?;

        log::info!(
            "Knowledge store ready: {} documents ({})",
            documents.len(),
            embeddings.model_name()
        );

        Ok(Self {
            storage,
            embeddings,
            inner: RwLock::new(Indexed { index, documents }),
        })
    }

    /// Embed and persist passages, then index them. No deduplication.
    pub fn add_documents(&self, passages: Vec<(String, Option<String>)>) -> Result<usize> {
        if passages.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = passages.iter().map(|(text, _)| text.clone()).collect();
        let vectors = self.embeddings.embed_batch(&texts)?;
        if vectors.len() != passages.len() {
            return Err(MediVoiceError::Embedding(format!(
                "Expected {} embeddings, got {}",
                passages.len(),
                vectors.len()
            )));
        }

        let docs: Vec<KnowledgeDocument> = passages
            .into_iter()
            .zip(vectors)
            .map(|((text, source), embedding)| KnowledgeDocument::new(text, source, embedding))
            .collect();

        self.storage.put_documents(&docs)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| MediVoiceError::Validation("knowledge index lock poisoned".into()))?;
        for doc in &docs {
            inner.index.insert(doc.id, &doc.embedding)?;
        }
        inner.index.rebuild()?;
        let added = docs.len();
        inner.documents.extend(docs.into_iter().map(|d| (d.id, d)));

        Ok(added)
    }

    /// Number of indexed documents.
    pub fn count(&self) -> usize {
        self.inner.read().map(|inner| inner.index.len()).unwrap_or(0)
    }

    /// Number of persisted documents, including ones the current model cannot index.
    pub fn stored_count(&self) -> Result<u64> {
        self.storage.count_documents()
    }

    fn try_search(&self, query: &str, k: usize) -> Result<String> {
        if k == 0 || self.count() == 0 {
            return Ok(String::new());
        }

        let query_vec = self.embeddings.embed(query)?;

        let inner = self
            .inner
            .read()
            .map_err(|_| MediVoiceError::Validation("knowledge index lock poisoned".into()))?;
        let hits = inner.index.search(&query_vec, k)?;

        let blocks: Vec<String> = hits
            .iter()
            .filter_map(|hit| inner.documents.get(&hit.id))
            .map(|doc| format!("[{}]\n{}", doc.source_label(), doc.text))
            .collect();

        Ok(blocks.join("\n\n"))
    }
}

impl Retriever for KnowledgeStore {
    fn search(&self, query: &str, k: usize) -> String {
        match self.try_search(query, k) {
            Ok(context) => context,
            Err(e) => {
                log::warn!("Knowledge search failed, continuing without context: {}", e);
                String::new()
            }
        }
    }
}
