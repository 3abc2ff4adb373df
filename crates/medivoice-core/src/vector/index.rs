use crate::error::{MediVoiceError, Result};
use crate::types::{DocumentId, Embedding};
use instant_distance::{Builder, HnswMap, Point, Search};
use rayon::prelude::*;
use std::collections::HashMap;

/// Result from a similarity search
#[derive(Debug, Clone)]
pub struct SimilarityResult {
    pub id: DocumentId,
    pub score: f32,    // Cosine similarity, 0.0 to 1.0
    pub distance: f32, // 1.0 - score
}

/// Trait for vector similarity search
pub trait VectorIndex: Send + Sync {
    /// Add a vector with associated document ID.
    fn insert(&mut self, id: DocumentId, embedding: &Embedding) -> Result<()>;

    /// Find the K nearest neighbours to a query vector, most similar first.
    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SimilarityResult>>;

    /// Number of vectors in the index.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rebuild the index from scratch (after bulk inserts).
    fn rebuild(&mut self) -> Result<()>;
}

/// Wrapper for embeddings to implement Point trait
#[derive(Clone, Debug)]
struct EmbeddingPoint(Vec<f32>);

impl Point for EmbeddingPoint {
    fn distance(&self, other: &Self) -> f32 {
        // Cosine distance = 1 - cosine similarity
        let dot: f32 = self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum();
        let norm_a: f32 = self.0.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = other.0.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 1.0;
        }
        1.0 - dot / (norm_a * norm_b)
    }
}

/// HNSW-based vector index implementation
pub struct HnswIndex {
    /// Built graph; `None` until the first `rebuild()`.
    index: Option<HnswMap<EmbeddingPoint, DocumentId>>,

    /// Raw vectors for rebuilding and brute-force search
    vectors: HashMap<DocumentId, Vec<f32>>,

    dimension: usize,
}

impl HnswIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            index: None,
            vectors: HashMap::new(),
            dimension,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn distance_to_similarity(distance: f32) -> f32 {
        (1.0 - distance).clamp(0.0, 1.0)
    }

    /// Exhaustive search, used until the HNSW graph has been built
    fn brute_force_search(&self, query: &Embedding, k: usize) -> Vec<SimilarityResult> {
        let query_point = EmbeddingPoint(query.clone());
        let mut results: Vec<SimilarityResult> = self
            .vectors
            .par_iter()
            .map(|(id, vec)| {
                let distance = query_point.distance(&EmbeddingPoint(vec.clone()));
                SimilarityResult {
                    id: *id,
                    score: Self::distance_to_similarity(distance),
                    distance,
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        results
    }
}

impl VectorIndex for HnswIndex {
    fn insert(&mut self, id: DocumentId, embedding: &Embedding) -> Result<()> {
        if embedding.len() != self.dimension {
            return Err(MediVoiceError::Validation(format!(
                "Embedding dimension mismatch: expected {}, got {}",
                self.dimension,
                embedding.len()
            )));
        }

        // The built graph goes stale here; search() falls back to brute force
        // until the next rebuild() so new documents are visible immediately.
        self.vectors.insert(id, embedding.clone());
        self.index = None;
        Ok(())
    }

    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SimilarityResult>> {
        if self.vectors.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(MediVoiceError::Validation(format!(
                "Query dimension mismatch: expected {}, got {}",
                self.dimension,
                query.len()
            )));
        }

        let index = match self.index.as_ref() {
            Some(index) => index,
            None => return Ok(self.brute_force_search(query, k)),
        };

        let query_point = EmbeddingPoint(query.clone());
        let mut search = Search::default();

        Ok(index
            .search(&query_point, &mut search)
            .take(k)
            .map(|item| SimilarityResult {
                id: *item.value,
                score: Self::distance_to_similarity(item.distance),
                distance: item.distance,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn rebuild(&mut self) -> Result<()> {
        if self.vectors.is_empty() {
            self.index = None;
            return Ok(());
        }

        let (points, values): (Vec<_>, Vec<_>) = self
            .vectors
            .iter()
            .map(|(id, vec)| (EmbeddingPoint(vec.clone()), *id))
            .unzip();

        self.index = Some(Builder::default().build(points, values));
        Ok(())
    }
}
