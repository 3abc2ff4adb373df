use crate::llm::prompt::{build_prompt, APOLOGY, DISCLAIMER};
use crate::llm::provider::{GenerationParams, InferenceProvider};
use crate::storage::CallLog;
use crate::types::{ProviderAttempt, NO_PROVIDER};
use std::sync::Arc;
use std::time::Instant;

/// Text produced by the chain and the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub provider: String,
}

impl Generation {
    pub fn is_degraded(&self) -> bool {
        self.provider == NO_PROVIDER
    }
}

/// Tries providers strictly in order and returns the first usable answer.
///
/// Every attempted call is appended to the call log, success or not.
/// Providers are never retried within one run and never called concurrently.
pub struct FallbackChain {
    providers: Vec<Arc<dyn InferenceProvider>>,
    call_log: Option<Arc<dyn CallLog>>,
    params: GenerationParams,
}

impl FallbackChain {
    pub fn new(providers: Vec<Arc<dyn InferenceProvider>>) -> Self {
        Self {
            providers,
            call_log: None,
            params: GenerationParams::default(),
        }
    }

    pub fn with_call_log(mut self, call_log: Arc<dyn CallLog>) -> Self {
        self.call_log = Some(call_log);
        self
    }

    /// Names of providers that will actually be attempted, in order.
    pub fn configured_providers(&self) -> Vec<&str> {
        self.providers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.name())
            .collect()
    }

    /// Generate an answer, logging attempts to the configured call log.
    pub async fn generate(&self, message: &str, context: &str) -> Generation {
        self.generate_with_log(message, context, self.call_log.as_deref())
            .await
    }

    /// Generate an answer without touching the call log.
    pub async fn generate_unlogged(&self, message: &str, context: &str) -> Generation {
        self.generate_with_log(message, context, None).await
    }

    async fn generate_with_log(
        &self,
        message: &str,
        context: &str,
        call_log: Option<&dyn CallLog>,
    ) -> Generation {
        let prompt = build_prompt(message, context);

        for provider in self.providers.iter().filter(|p| p.is_configured()) {
            let start = Instant::now();
            let result = provider.complete(&prompt, self.params).await;
            let latency_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(text) if !text.trim().is_empty() => {
                    log::info!(
                        "{} response generated in {}ms",
                        provider.name(),
                        latency_ms
                    );
                    record(
                        call_log,
                        ProviderAttempt::succeeded(provider.name(), provider.model(), latency_ms),
                    );
                    return Generation {
                        text: format!("{}{}", text, DISCLAIMER),
                        provider: provider.name().to_string(),
                    };
                }
                Ok(_) => {
                    log::warn!("{} failed: provider returned empty text", provider.name());
                    record(
                        call_log,
                        ProviderAttempt::failed(
                            provider.name(),
                            provider.model(),
                            latency_ms,
                            "provider returned empty text".to_string(),
                        ),
                    );
                }
                Err(e) => {
                    log::warn!("{} failed: {}", provider.name(), e);
                    record(
                        call_log,
                        ProviderAttempt::failed(
                            provider.name(),
                            provider.model(),
                            latency_ms,
                            e.to_string(),
                        ),
                    );
                }
            }
        }

        log::error!("All LLM providers failed");
        Generation {
            text: format!("{}{}", APOLOGY, DISCLAIMER),
            provider: NO_PROVIDER.to_string(),
        }
    }
}

fn record(call_log: Option<&dyn CallLog>, attempt: ProviderAttempt) {
    if let Some(call_log) = call_log {
        if let Err(e) = call_log.append_attempt(&attempt) {
            log::error!("Failed to log LLM call: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MediVoiceError, Result};
    use crate::llm::ProviderError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Scripted {
        name: &'static str,
        configured: bool,
        reply: std::result::Result<&'static str, ProviderError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(name: &'static str, text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                configured: true,
                reply: Ok(text),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str, err: ProviderError) -> Arc<Self> {
            Arc::new(Self {
                name,
                configured: true,
                reply: Err(err),
                calls: AtomicUsize::new(0),
            })
        }

        fn unconfigured(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                configured: false,
                reply: Ok("should not be used"),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InferenceProvider for Scripted {
        fn name(&self) -> &str {
            self.name
        }
        fn model(&self) -> &str {
            "test-model"
        }
        fn is_configured(&self) -> bool {
            self.configured
        }
        async fn complete(
            &self,
            _prompt: &str,
            _params: GenerationParams,
        ) -> std::result::Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map(str::to_string)
        }
    }

    #[derive(Default)]
    struct MemoryLog(Mutex<Vec<ProviderAttempt>>);

    impl CallLog for MemoryLog {
        fn append_attempt(&self, attempt: &ProviderAttempt) -> Result<()> {
            self.0.lock().unwrap().push(attempt.clone());
            Ok(())
        }
    }

    struct BrokenLog;

    impl CallLog for BrokenLog {
        fn append_attempt(&self, _attempt: &ProviderAttempt) -> Result<()> {
            Err(MediVoiceError::Validation("disk full".into()))
        }
    }

    #[tokio::test]
    async fn test_falls_through_to_first_success() {
        let a = Scripted::failing("grok", ProviderError::Status { status: 503, body: "busy".into() });
        let b = Scripted::ok("groq", "Rest and drink fluids.");
        let c = Scripted::ok("gemini", "unused");
        let log = Arc::new(MemoryLog::default());

        let chain = FallbackChain::new(vec![a.clone(), b.clone(), c.clone()])
            .with_call_log(log.clone());
        let generation = chain.generate("I have a fever", "").await;

        assert_eq!(generation.provider, "groq");
        assert_eq!(generation.text, format!("Rest and drink fluids.{}", DISCLAIMER));
        assert_eq!(c.calls(), 0);

        let attempts = log.0.lock().unwrap();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].provider, "grok");
        assert!(!attempts[0].success);
        assert!(attempts[0].error.as_deref().unwrap().contains("503"));
        assert_eq!(attempts[1].provider, "groq");
        assert!(attempts[1].success);
    }

    #[tokio::test]
    async fn test_no_configured_providers() {
        let a = Scripted::unconfigured("grok");
        let log = Arc::new(MemoryLog::default());
        let chain = FallbackChain::new(vec![a.clone()]).with_call_log(log.clone());

        let generation = chain.generate("hello", "").await;
        assert_eq!(generation.provider, NO_PROVIDER);
        assert_eq!(generation.text, format!("{}{}", APOLOGY, DISCLAIMER));
        assert!(generation.is_degraded());
        assert_eq!(a.calls(), 0);
        assert!(log.0.lock().unwrap().is_empty());

        let empty = FallbackChain::new(vec![]).generate("hello", "").await;
        assert_eq!(empty.provider, NO_PROVIDER);
    }

    #[tokio::test]
    async fn test_all_fail_logs_each_attempt_once() {
        let a = Scripted::failing("grok", ProviderError::Timeout(30));
        let b = Scripted::failing("groq", ProviderError::Empty);
        let log = Arc::new(MemoryLog::default());
        let chain = FallbackChain::new(vec![a.clone(), b.clone()]).with_call_log(log.clone());

        let generation = chain.generate("hello", "").await;
        assert_eq!(generation.provider, NO_PROVIDER);
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
        assert_eq!(log.0.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_text_counts_as_failure() {
        let a = Scripted::ok("grok", "   ");
        let b = Scripted::ok("groq", "Answer");
        let chain = FallbackChain::new(vec![a, b]);
        assert_eq!(chain.generate("hello", "").await.provider, "groq");
    }

    #[tokio::test]
    async fn test_call_log_failure_does_not_change_result() {
        let a = Scripted::failing("grok", ProviderError::Http("refused".into()));
        let b = Scripted::ok("groq", "Answer");
        let chain = FallbackChain::new(vec![a, b]).with_call_log(Arc::new(BrokenLog));

        let generation = chain.generate("hello", "").await;
        assert_eq!(generation.provider, "groq");
        assert!(generation.text.starts_with("Answer"));
    }

    #[tokio::test]
    async fn test_unlogged_generation_skips_call_log() {
        let log = Arc::new(MemoryLog::default());
        let chain = FallbackChain::new(vec![Scripted::ok("groq", "Answer")])
            .with_call_log(log.clone());

        chain.generate_unlogged("hello", "").await;
        assert!(log.0.lock().unwrap().is_empty());
        assert_eq!(chain.configured_providers(), vec!["groq"]);
    }
}
