use async_trait::async_trait;
use std::time::Duration;

/// Upper bound on a single provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Sampling parameters sent with every completion. Not user-tunable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

/// Why a provider call produced no usable text.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("provider has no credential configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("provider returned empty text")]
    Empty,

    #[error("request timed out after {0} seconds")]
    Timeout(u64),
}

impl ProviderError {
    /// The URL is dropped from the message; some providers carry credentials in it.
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout(timeout.as_secs())
        } else {
            ProviderError::Http(e.without_url().to_string())
        }
    }
}

/// One interchangeable text-generation backend.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Provider id recorded on attempts and conversations (e.g. "groq").
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// False when the credential is missing or empty. Unconfigured providers
    /// are skipped by the chain, not attempted.
    fn is_configured(&self) -> bool;

    async fn complete(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, ProviderError>;
}

/// Shorten a response body for use in an error message.
pub(crate) fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = GenerationParams::default();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.max_tokens, 500);
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        let s = snippet(&long);
        assert!(s.ends_with("..."));
        assert_eq!(s.chars().count(), 203);
        assert_eq!(snippet("short"), "short");
    }
}
