use crate::error::{MediVoiceError, Result};
use crate::types::Embedding;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

/// Service for generating text embeddings
pub trait EmbeddingService: Send + Sync {
    /// Generate embedding for a single text.
    fn embed(&self, text: &str) -> Result<Embedding>;

    /// Batch embedding for bulk loads. FastEmbed batches internally.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Embedding dimension for the current model.
    fn dimension(&self) -> usize;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}

/// Config names accepted by [`FastEmbedService::from_name`].
pub const SUPPORTED_EMBEDDING_MODELS: &[&str] = &[
    "sentence-transformers/all-MiniLM-L6-v2",
    "sentence-transformers/all-MiniLM-L12-v2",
    "BAAI/bge-small-en-v1.5",
    "BAAI/bge-base-en-v1.5",
];

/// Stored vectors are tied to one model, so an unrecognised name is an error.
fn resolve_model(name: &str) -> Result<EmbeddingModel> {
    match name {
        "sentence-transformers/all-MiniLM-L6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "sentence-transformers/all-MiniLM-L12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "BAAI/bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "BAAI/bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
        other => Err(MediVoiceError::Embedding(format!(
            "Unknown embedding model: {} (supported: {})",
            other,
            SUPPORTED_EMBEDDING_MODELS.join(", ")
        ))),
    }
}

/// FastEmbed-based embedding service
pub struct FastEmbedService {
    model: TextEmbedding,
    model_name: String,
    dimension: usize,
}

impl FastEmbedService {
    /// Create a new FastEmbed service with the default model (MiniLM-L6, 384 dims)
    pub fn new() -> Result<Self> {
        Self::with_model(EmbeddingModel::AllMiniLML6V2)
    }

    /// Resolve a model from its config name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::with_model(resolve_model(name)?)
    }

    /// Create a new FastEmbed service with a specific model
    pub fn with_model(model: EmbeddingModel) -> Result<Self> {
        let dimension = match model {
            EmbeddingModel::BGESmallENV15 => 384,
            EmbeddingModel::BGEBaseENV15 => 768,
            EmbeddingModel::BGELargeENV15 => 1024,
            EmbeddingModel::AllMiniLML6V2 => 384,
            EmbeddingModel::AllMiniLML12V2 => 384,
            _ => 384,
        };
        let model_name = format!("{:?}", model);

        let fastembed_model = TextEmbedding::try_new(InitOptions::new(model)).map_err(|e| {
            MediVoiceError::Embedding(format!("Failed to initialize FastEmbed: {}", e))
        })?;

        Ok(Self {
            model: fastembed_model,
            model_name,
            dimension,
        })
    }
}

impl EmbeddingService for FastEmbedService {
    fn embed(&self, text: &str) -> Result<Embedding> {
        let embeddings = self
            .model
            .embed(vec![text.to_string()], None)
            .map_err(|e| MediVoiceError::Embedding(format!("Embedding failed: {}", e)))?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MediVoiceError::Embedding("No embedding generated".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| MediVoiceError::Embedding(format!("Batch embedding failed: {}", e)))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl<E: EmbeddingService + ?Sized> EmbeddingService for std::sync::Arc<E> {
    fn embed(&self, text: &str) -> Result<Embedding> {
        (**self).embed(text)
    }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        (**self).embed_batch(texts)
    }
    fn dimension(&self) -> usize {
        (**self).dimension()
    }
    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
