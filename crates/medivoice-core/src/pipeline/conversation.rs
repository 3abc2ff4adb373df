use crate::knowledge::Retriever;
use crate::llm::FallbackChain;
use crate::outcome::Outcome;
use crate::pipeline::PipelineError;
use crate::speech::{DisabledSpeech, SpeechToText, TextToSpeech};
use crate::storage::Storage;
use crate::triage::{EmergencyDetector, KeywordTable, SymptomExtractor};
use crate::types::{
    ConversationId, ConversationRecord, InteractionInput, SymptomList, EMERGENCY_PROVIDER,
};
use base64::Engine;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Number of knowledge passages placed in the prompt.
pub const DEFAULT_TOP_K: usize = 3;

/// Safety message returned verbatim when an emergency is detected.
pub const EMERGENCY_MESSAGE: &str = "🚨 EMERGENCY DETECTED 🚨\n\n\
Your symptoms suggest a medical emergency. \
Please call 112 immediately or visit the nearest hospital. \
Do not delay seeking professional medical care.\n\n\
If you are unable to get to a hospital, ask someone nearby to help you.";

/// Chat variant of [`EMERGENCY_MESSAGE`].
pub const TELEGRAM_EMERGENCY_MESSAGE: &str = "🚨 EMERGENCY DETECTED 🚨\n\n\
Your symptoms suggest a medical emergency. \
Please call 112 immediately or visit the nearest hospital. \
Do not delay seeking professional medical care.";

/// What a caller gets back from one run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InteractionResponse {
    pub text_response: String,
    /// Base64 MP3, absent when speech was skipped or failed.
    pub audio_base64: Option<String>,
    pub is_emergency: bool,
    pub symptoms_detected: SymptomList,
    pub conversation_id: ConversationId,
    #[serde(skip)]
    pub provider_used: String,
    #[serde(skip)]
    pub response_time_ms: u64,
}

/// Reply for channels that keep no conversation history.
#[derive(Debug, Clone, PartialEq)]
pub struct TextReply {
    pub text: String,
    pub is_emergency: bool,
    pub provider_used: String,
}

/// Stage outcome before speech and persistence.
struct Answer {
    text: String,
    provider: String,
    symptoms: SymptomList,
    is_emergency: bool,
}

/// Runs one health query end to end.
///
/// ```text
/// RESOLVE_TEXT -> EMERGENCY -> SPEAK -> PERSIST
///             \-> EXTRACT -> RETRIEVE -> GENERATE -> SPEAK -> PERSIST
/// ```
///
/// Runs are independent; the pipeline holds no per-request state.
pub struct ConversationPipeline {
    detector: EmergencyDetector,
    extractor: SymptomExtractor,
    retriever: Arc<dyn Retriever>,
    chain: FallbackChain,
    stt: Arc<dyn SpeechToText>,
    tts: Arc<dyn TextToSpeech>,
    storage: Arc<dyn Storage>,
    top_k: usize,
}

impl ConversationPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        retriever: Arc<dyn Retriever>,
        chain: FallbackChain,
    ) -> Self {
        Self {
            detector: EmergencyDetector::default(),
            extractor: SymptomExtractor::default(),
            retriever,
            chain,
            stt: Arc::new(DisabledSpeech),
            tts: Arc::new(DisabledSpeech),
            storage,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_keywords(mut self, table: KeywordTable) -> Self {
        self.detector = EmergencyDetector::new(table.clone());
        self.extractor = SymptomExtractor::new(table);
        self
    }

    pub fn with_speech(
        mut self,
        stt: Arc<dyn SpeechToText>,
        tts: Arc<dyn TextToSpeech>,
    ) -> Self {
        self.stt = stt;
        self.tts = tts;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn chain(&self) -> &FallbackChain {
        &self.chain
    }

    /// Execute one run. `speak` controls whether TTS is attempted.
    pub async fn run(
        &self,
        input: InteractionInput,
        speak: bool,
    ) -> Result<InteractionResponse, PipelineError> {
        let started = Instant::now();

        let from_audio = input.has_audio();
        let message = self.resolve_text(input).await?;
        log::info!("User message: {}", message);

        let answer = self.answer(&message, true).await;

        let audio_base64 = if speak {
            match self.tts.synthesize(&answer.text).await {
                Outcome::Ready(bytes) => {
                    Some(base64::engine::general_purpose::STANDARD.encode(bytes))
                }
                Outcome::Degraded { reason } => {
                    log::warn!("Continuing without audio: {}", reason);
                    None
                }
            }
        } else {
            None
        };

        let response_time_ms = started.elapsed().as_millis() as u64;
        let record = ConversationRecord::new(
            message.clone(),
            from_audio.then(|| message.clone()),
            answer.symptoms.clone(),
            answer.text.clone(),
            answer.is_emergency,
            answer.provider.clone(),
            response_time_ms,
        );
        let conversation_id = self.storage.save_conversation(&record)?;

        log::info!(
            "Conversation saved (ID: {}, Time: {}ms)",
            conversation_id,
            response_time_ms
        );

        Ok(InteractionResponse {
            text_response: answer.text,
            audio_base64,
            is_emergency: answer.is_emergency,
            symptoms_detected: answer.symptoms,
            conversation_id,
            provider_used: answer.provider,
            response_time_ms,
        })
    }

    /// Answer a plain text message without persisting anything or writing the
    /// call log.
    pub async fn respond_text(&self, message: &str) -> TextReply {
        let answer = self.answer(message, false).await;
        TextReply {
            text: if answer.is_emergency {
                TELEGRAM_EMERGENCY_MESSAGE.to_string()
            } else {
                answer.text
            },
            is_emergency: answer.is_emergency,
            provider_used: answer.provider,
        }
    }

    async fn resolve_text(&self, input: InteractionInput) -> Result<String, PipelineError> {
        if input.has_audio() {
            let audio = input.audio.unwrap_or_default();
            return match self.stt.transcribe(&audio).await {
                Outcome::Ready(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
                Outcome::Ready(_) => {
                    log::warn!("Transcription returned no text");
                    Err(PipelineError::TranscriptionFailed)
                }
                Outcome::Degraded { reason } => {
                    log::warn!("Transcription failed: {}", reason);
                    Err(PipelineError::TranscriptionFailed)
                }
            };
        }

        match input.text {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(PipelineError::MissingInput),
        }
    }

    async fn answer(&self, message: &str, logged: bool) -> Answer {
        if let Some(phrase) = self.detector.first_match(message) {
            log::warn!("Emergency detected (matched \"{}\")", phrase);
            return Answer {
                text: EMERGENCY_MESSAGE.to_string(),
                provider: EMERGENCY_PROVIDER.to_string(),
                symptoms: Vec::new(),
                is_emergency: true,
            };
        }

        let symptoms = self.extractor.extract(message);
        log::info!("Symptoms detected: {:?}", symptoms);

        let context = self.retrieve(message).await;
        log::info!("Retrieved medical context ({} chars)", context.len());

        let generation = if logged {
            self.chain.generate(message, &context).await
        } else {
            self.chain.generate_unlogged(message, &context).await
        };
        log::info!("AI response generated using {}", generation.provider);

        Answer {
            text: generation.text,
            provider: generation.provider,
            symptoms,
            is_emergency: false,
        }
    }

    /// Embedding and index search are CPU-bound, so they run off the async workers.
    async fn retrieve(&self, message: &str) -> String {
        let retriever = Arc::clone(&self.retriever);
        let query = message.to_string();
        let k = self.top_k;

        match tokio::task::spawn_blocking(move || retriever.search(&query, k)).await {
            Ok(context) => context,
            Err(e) => {
                log::warn!("Knowledge retrieval task failed: {}", e);
                String::new()
            }
        }
    }
}
