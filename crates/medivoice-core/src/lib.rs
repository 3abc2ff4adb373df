pub mod types;
pub mod error;
pub mod outcome;
pub mod storage;
pub mod vector;
pub mod knowledge;
pub mod triage;
pub mod llm;
pub mod speech;
pub mod notify;
pub mod pipeline;

pub use error::{MediVoiceError, Result};
pub use outcome::Outcome;
pub use types::*;
pub use storage::{
    CallLog, ConversationFilter, RedbStorage, Storage, StorageStats, CURRENT_SCHEMA_VERSION,
};
pub use vector::{
    EmbeddingService, FastEmbedService, HnswIndex, SimilarityResult, VectorIndex,
    SUPPORTED_EMBEDDING_MODELS,
};
pub use knowledge::{load_knowledge, KnowledgeStore, Retriever, SeedEntry};
pub use triage::{EmergencyDetector, KeywordTable, SymptomExtractor};
pub use llm::{
    FallbackChain, GeminiProvider, Generation, GenerationParams, InferenceProvider,
    OpenAiCompatibleProvider, ProviderError,
};
pub use speech::{DisabledSpeech, GoogleTts, SpeechToText, TextToSpeech, VoiceSettings, WhisperTranscriber};
pub use notify::{TelegramClient, WebhookNotifier};
pub use pipeline::{ConversationPipeline, InteractionResponse, PipelineError, TextReply};
