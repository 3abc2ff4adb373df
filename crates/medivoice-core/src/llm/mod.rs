//! Inference providers and the ordered fallback chain over them.

mod fallback;
mod gemini;
mod openai;
mod prompt;
mod provider;

pub use fallback::{FallbackChain, Generation};
pub use gemini::{GeminiProvider, GEMINI_BASE_URL};
pub use openai::{OpenAiCompatibleProvider, GROQ_BASE_URL, XAI_BASE_URL};
pub use prompt::{build_prompt, APOLOGY, DISCLAIMER, SYSTEM_PROMPT};
pub use provider::{GenerationParams, InferenceProvider, ProviderError, DEFAULT_PROVIDER_TIMEOUT};
