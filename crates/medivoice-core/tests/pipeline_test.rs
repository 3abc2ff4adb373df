use async_trait::async_trait;
use medivoice_core::llm::{DISCLAIMER, GenerationParams};
use medivoice_core::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

/// Bag-of-topics embedding so retrieval is deterministic without a model.
struct KeywordEmbedder;

impl EmbeddingService for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        let t = text.to_lowercase();
        Ok(["malaria", "fever", "cholera", "water", "typhoid"]
            .iter()
            .map(|w| if t.contains(w) { 1.0 } else { 0.0 })
            .chain(std::iter::once(0.05))
            .collect())
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        6
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

struct Provider {
    name: &'static str,
    reply: std::result::Result<&'static str, ProviderError>,
    calls: AtomicUsize,
    last_prompt: std::sync::Mutex<String>,
}

impl Provider {
    fn new(
        name: &'static str,
        reply: std::result::Result<&'static str, ProviderError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(String::new()),
        })
    }
}

#[async_trait]
impl InferenceProvider for Provider {
    fn name(&self) -> &str {
        self.name
    }
    fn model(&self) -> &str {
        "fake"
    }
    fn is_configured(&self) -> bool {
        true
    }
    async fn complete(
        &self,
        prompt: &str,
        _params: GenerationParams,
    ) -> std::result::Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = prompt.to_string();
        self.reply.clone().map(str::to_string)
    }
}

struct BrokenTts;

#[async_trait]
impl TextToSpeech for BrokenTts {
    async fn synthesize(&self, _text: &str) -> Outcome<Vec<u8>> {
        Outcome::degraded("quota exceeded")
    }
}

const SEED: &str = r#"[
    {"text": "Malaria causes fever, chills and sweating. Visit a clinic for a rapid test.", "metadata": {"source": "Ghana Health Service"}},
    {"text": "Cholera spreads through contaminated water. Use oral rehydration salts.", "metadata": {"source": "WHO"}},
    {"text": "Typhoid fever is treated with antibiotics prescribed by a doctor."}
]"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ── Full pipeline over real storage and retrieval ────────────────────────────

#[tokio::test]
async fn test_pipeline_end_to_end_with_fallback() {
    init_logging();
    let dir = tempdir().unwrap();
    let storage = Arc::new(RedbStorage::open(dir.path().join("medivoice.redb")).unwrap());

    let knowledge = Arc::new(KnowledgeStore::open(storage.clone(), Arc::new(KeywordEmbedder)).unwrap());
    let seed = dir.path().join("medical_knowledge.json");
    std::fs::write(&seed, SEED).unwrap();
    assert_eq!(load_knowledge(&seed, &knowledge).unwrap(), 3);

    let grok = Provider::new("grok", Err(ProviderError::Timeout(30)));
    let groq = Provider::new("groq", Ok("It may be malaria. Please get tested."));
    let gemini = Provider::new("gemini", Ok("unused"));

    let chain = FallbackChain::new(vec![grok.clone(), groq.clone(), gemini.clone()])
        .with_call_log(storage.clone());
    let pipeline = ConversationPipeline::new(storage.clone(), knowledge.clone(), chain)
        .with_speech(Arc::new(DisabledSpeech), Arc::new(BrokenTts));

    let response = pipeline
        .run(InteractionInput::text("I think I have malaria, fever since Monday"), true)
        .await
        .unwrap();

    assert_eq!(
        response.text_response,
        format!("It may be malaria. Please get tested.{}", DISCLAIMER)
    );
    assert_eq!(response.symptoms_detected, vec!["fever"]);
    assert!(response.audio_base64.is_none());
    assert_eq!(gemini.calls.load(Ordering::SeqCst), 0);

    // The highest-ranked passage is placed in the prompt with its source label
    let prompt = groq.last_prompt.lock().unwrap().clone();
    assert!(prompt.contains("[Ghana Health Service]\nMalaria causes fever"));

    let attempts = storage.list_attempts(10).unwrap();
    assert_eq!(attempts.len(), 2);
    // newest first
    assert_eq!(attempts[0].provider, "groq");
    assert!(attempts[0].success);
    assert_eq!(attempts[1].provider, "grok");
    assert!(!attempts[1].success);

    let saved = storage
        .get_conversation(response.conversation_id)
        .unwrap()
        .expect("conversation should be persisted");
    assert_eq!(saved.provider_used, "groq");
    assert_eq!(saved.symptoms_detected, vec!["fever"]);
    assert!(!saved.is_emergency);
}

#[tokio::test]
async fn test_emergency_record_survives_reopen() {
    init_logging();
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("medivoice.redb");

    let conversation_id = {
        let storage = Arc::new(RedbStorage::open(&db_path).unwrap());
        let knowledge =
            Arc::new(KnowledgeStore::open(storage.clone(), Arc::new(KeywordEmbedder)).unwrap());
        let provider = Provider::new("groq", Ok("unused"));
        let pipeline = ConversationPipeline::new(
            storage.clone(),
            knowledge,
            FallbackChain::new(vec![provider.clone()]).with_call_log(storage.clone()),
        );

        let response = pipeline
            .run(InteractionInput::text("My brother is UNCONSCIOUS"), false)
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        response.conversation_id
    };

    let storage = RedbStorage::open(&db_path).unwrap();
    let saved = storage.get_conversation(conversation_id).unwrap().unwrap();
    assert!(saved.is_emergency);
    assert_eq!(saved.provider_used, EMERGENCY_PROVIDER);
    assert!(saved.symptoms_detected.is_empty());

    let emergencies = storage
        .list_conversations(ConversationFilter::new().emergencies())
        .unwrap();
    assert_eq!(emergencies.len(), 1);
}

#[tokio::test]
async fn test_custom_keywords_flow_through() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(RedbStorage::open(dir.path().join("medivoice.redb")).unwrap());
    let knowledge =
        Arc::new(KnowledgeStore::open(storage.clone(), Arc::new(KeywordEmbedder)).unwrap());

    let table = KeywordTable::new(vec!["snake bite".into()], vec!["itching".into()]);
    let pipeline = ConversationPipeline::new(storage.clone(), knowledge, FallbackChain::new(vec![]))
        .with_keywords(table);

    let response = pipeline
        .run(InteractionInput::text("Snake bite on my ankle"), false)
        .await
        .unwrap();
    assert!(response.is_emergency);

    let response = pipeline
        .run(InteractionInput::text("itching and chest pain"), false)
        .await
        .unwrap();
    assert!(!response.is_emergency);
    assert_eq!(response.symptoms_detected, vec!["itching"]);
    assert_eq!(response.provider_used, NO_PROVIDER);
}
