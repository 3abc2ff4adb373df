use crate::llm::provider::{snippet, GenerationParams, InferenceProvider, ProviderError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

pub const XAI_BASE_URL: &str = "https://api.x.ai/v1";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Any backend speaking the OpenAI `/chat/completions` protocol (xAI Grok, Groq).
pub struct OpenAiCompatibleProvider {
    name: String,
    model: String,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            name: name.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout,
            client,
        })
    }

    /// xAI Grok with its default model.
    pub fn grok(api_key: Option<String>) -> Result<Self, ProviderError> {
        Self::new("grok", "grok-beta", XAI_BASE_URL, api_key, super::DEFAULT_PROVIDER_TIMEOUT)
    }

    /// Groq-hosted Llama with its default model.
    pub fn groq(api_key: Option<String>) -> Result<Self, ProviderError> {
        Self::new(
            "groq",
            "llama-3.1-70b-versatile",
            GROQ_BASE_URL,
            api_key,
            super::DEFAULT_PROVIDER_TIMEOUT,
        )
    }
}

/// Pull `choices[0].message.content` out of a chat completion body.
pub(crate) fn parse_chat_completion(body: &Value) -> Result<String, ProviderError> {
    let content = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .ok_or_else(|| ProviderError::Malformed("missing choices[0].message.content".into()))?;

    let text = match content {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => {
            return Err(ProviderError::Malformed(format!(
                "content is not a string: {}",
                other
            )))
        }
    };

    if text.is_empty() {
        return Err(ProviderError::Empty);
    }
    Ok(text)
}

#[async_trait]
impl InferenceProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured)?;
        let url = format!("{}/chat/completions", self.base_url);

        let request_body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(format!("Failed to parse response: {}", e)))?;

        parse_chat_completion(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_completion() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "  Drink clean water.  "}}]
        });
        assert_eq!(parse_chat_completion(&body).unwrap(), "Drink clean water.");
    }

    #[test]
    fn test_parse_rejects_missing_and_empty() {
        assert!(matches!(
            parse_chat_completion(&json!({"choices": []})),
            Err(ProviderError::Malformed(_))
        ));
        assert!(matches!(
            parse_chat_completion(&json!({"choices": [{"message": {"content": "   "}}]})),
            Err(ProviderError::Empty)
        ));
        assert!(matches!(
            parse_chat_completion(&json!({"choices": [{"message": {"content": null}}]})),
            Err(ProviderError::Empty)
        ));
    }

    #[test]
    fn test_blank_key_is_unconfigured() {
        let p = OpenAiCompatibleProvider::grok(Some("  ".into())).unwrap();
        assert!(!p.is_configured());
        assert_eq!(p.name(), "grok");
        assert_eq!(p.model(), "grok-beta");

        let p = OpenAiCompatibleProvider::groq(Some("gsk_test".into())).unwrap();
        assert!(p.is_configured());
    }

    #[tokio::test]
    async fn test_complete_without_key_fails_fast() {
        let p = OpenAiCompatibleProvider::grok(None).unwrap();
        let err = p.complete("hi", GenerationParams::default()).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured));
    }
}
