//! Builds the core services from a [`MediVoiceConfig`].

use crate::config::{MediVoiceConfig, ProviderConfig, ProviderKind, SpeechConfig};
use anyhow::Context;
use medivoice_core::llm::{GEMINI_BASE_URL, GROQ_BASE_URL, XAI_BASE_URL};
use medivoice_core::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Everything a command needs to run interactions.
pub struct Services {
    pub storage: Arc<RedbStorage>,
    pub knowledge: Arc<KnowledgeStore>,
    pub pipeline: Arc<ConversationPipeline>,
}

impl Services {
    /// Open storage, load the embedding model, index stored passages, and
    /// assemble the pipeline. Speech stays disabled unless `with_speech`.
    pub fn build(config: &MediVoiceConfig, with_speech: bool) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.server.data_dir).with_context(|| {
            format!("creating data dir {}", config.server.data_dir.display())
        })?;

        info!("Opening database...");
        let storage = Arc::new(RedbStorage::open(config.db_path())?);
        let stats = storage.stats()?;
        info!(
            "Database loaded: {} conversations, {} documents, {} provider attempts",
            stats.conversation_count, stats.document_count, stats.attempt_count
        );

        info!("Loading embedding model...");
        let embeddings = Arc::new(FastEmbedService::from_name(&config.knowledge.embedding_model)?);
        info!("Embedding model loaded: {}", embeddings.model_name());

        let knowledge = Arc::new(KnowledgeStore::open(storage.clone(), embeddings)?);
        info!("Indexed {} knowledge passages", knowledge.count());

        let providers = build_providers(&config.providers)?;
        let chain = FallbackChain::new(providers).with_call_log(storage.clone());
        let configured = chain.configured_providers();
        if configured.is_empty() {
            warn!("No inference provider has a credential; every answer will be the fallback apology");
        } else {
            info!("Provider fallback order: {}", configured.join(" -> "));
        }

        let mut pipeline =
            ConversationPipeline::new(storage.clone(), knowledge.clone(), chain)
                .with_keywords(config.triage.clone())
                .with_top_k(config.knowledge.top_k);
        if with_speech {
            let (stt, tts) = build_speech(&config.speech)?;
            pipeline = pipeline.with_speech(stt, tts);
        }

        Ok(Self {
            storage,
            knowledge,
            pipeline: Arc::new(pipeline),
        })
    }

    /// Load the configured seed file into an empty store.
    pub fn load_seed(&self, config: &MediVoiceConfig) -> anyhow::Result<usize> {
        match &config.knowledge.seed_file {
            Some(path) => Ok(load_knowledge(path, &self.knowledge)?),
            None => Ok(0),
        }
    }
}

/// Instantiate providers in configured order.
pub fn build_providers(
    configs: &[ProviderConfig],
) -> anyhow::Result<Vec<Arc<dyn InferenceProvider>>> {
    configs
        .iter()
        .map(|p| -> anyhow::Result<Arc<dyn InferenceProvider>> {
            let timeout = Duration::from_secs(p.timeout_secs);
            let key = p.resolved_key();
            let provider: Arc<dyn InferenceProvider> = match p.kind {
                ProviderKind::OpenaiCompatible => {
                    let base_url = p.base_url.clone().unwrap_or_else(|| {
                        if p.name == "grok" {
                            XAI_BASE_URL.to_string()
                        } else {
                            GROQ_BASE_URL.to_string()
                        }
                    });
                    Arc::new(OpenAiCompatibleProvider::new(
                        p.name.clone(),
                        p.model.clone(),
                        base_url,
                        key,
                        timeout,
                    )?)
                }
                ProviderKind::Gemini => {
                    let base_url = p
                        .base_url
                        .clone()
                        .unwrap_or_else(|| GEMINI_BASE_URL.to_string());
                    Arc::new(
                        GeminiProvider::new(p.model.clone(), base_url, key, timeout)?
                            .with_name(p.name.clone()),
                    )
                }
            };
            Ok(provider)
        })
        .collect()
}

/// Whisper and Google TTS when their keys resolve, disabled otherwise.
pub fn build_speech(
    config: &SpeechConfig,
) -> anyhow::Result<(Arc<dyn SpeechToText>, Arc<dyn TextToSpeech>)> {
    let stt: Arc<dyn SpeechToText> = match config.resolved_whisper_key() {
        Some(key) => Arc::new(WhisperTranscriber::new(key)?),
        None => {
            warn!("Speech-to-text disabled: no Whisper API key");
            Arc::new(DisabledSpeech)
        }
    };
    let tts: Arc<dyn TextToSpeech> = match config.resolved_tts_key() {
        Some(key) => Arc::new(GoogleTts::new(key, config.voice.clone())?),
        None => {
            warn!("Text-to-speech disabled: no Google TTS API key");
            Arc::new(DisabledSpeech)
        }
    };
    Ok((stt, tts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_providers_keeps_order_and_names() {
        let mut configs = MediVoiceConfig::default().providers;
        for p in &mut configs {
            p.api_key_env = None;
        }
        configs[2].api_key = Some("g-key".into());
        configs[2].name = "gemini-backup".into();

        let providers = build_providers(&configs).unwrap();
        let names: Vec<_> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, ["grok", "groq", "gemini-backup"]);

        let configured: Vec<_> = providers.iter().map(|p| p.is_configured()).collect();
        assert_eq!(configured, [false, false, true]);
    }

    #[test]
    fn test_speech_disabled_without_keys() {
        let config = SpeechConfig {
            whisper_api_key_env: String::new(),
            tts_api_key_env: String::new(),
            ..SpeechConfig::default()
        };
        assert!(build_speech(&config).is_ok());
    }
}
