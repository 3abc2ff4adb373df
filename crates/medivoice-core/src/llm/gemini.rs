use crate::llm::provider::{snippet, GenerationParams, InferenceProvider, ProviderError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini via the `generateContent` REST endpoint.
pub struct GeminiProvider {
    name: String,
    model: String,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(
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
            name: "gemini".to_string(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout,
            client,
        })
    }

    /// Gemini 1.5 Flash on the public endpoint.
    pub fn flash(api_key: Option<String>) -> Result<Self, ProviderError> {
        Self::new(
            "gemini-1.5-flash",
            GEMINI_BASE_URL,
            api_key,
            super::DEFAULT_PROVIDER_TIMEOUT,
        )
    }

    /// Override the provider id (when several Gemini entries are configured).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn parse_generate_content(body: &Value) -> Result<String, ProviderError> {
    let parts = body
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            let reason = body
                .get("promptFeedback")
                .and_then(|f| f.get("blockReason"))
                .and_then(|r| r.as_str())
                .map(|r| format!("prompt blocked: {}", r))
                .unwrap_or_else(|| "missing candidates[0].content.parts".to_string());
            ProviderError::Malformed(reason)
        })?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    let text = text.trim();
    if text.is_empty() {
        return Err(ProviderError::Empty);
    }
    Ok(text.to_string())
}

#[async_trait]
impl InferenceProvider for GeminiProvider {
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
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let request_body = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": params.temperature,
                "maxOutputTokens": params.max_tokens,
            },
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
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
            .map_err(|e| {
                ProviderError::Malformed(format!("Failed to parse response: {}", e.without_url()))
            })?;

        parse_generate_content(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_joins_parts() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "Rest, "}, {"text": "and drink fluids."}]}}]
        });
        assert_eq!(parse_generate_content(&body).unwrap(), "Rest, and drink fluids.");
    }

    #[test]
    fn test_parse_reports_block_reason() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        match parse_generate_content(&body) {
            Err(ProviderError::Malformed(msg)) => assert!(msg.contains("SAFETY")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_candidate() {
        let body = json!({"candidates": [{"content": {"parts": []}}]});
        assert!(matches!(parse_generate_content(&body), Err(ProviderError::Empty)));
    }

    #[test]
    fn test_flash_defaults() {
        let p = GeminiProvider::flash(None).unwrap();
        assert_eq!(p.name(), "gemini");
        assert_eq!(p.model(), "gemini-1.5-flash");
        assert!(!p.is_configured());
    }

    #[tokio::test]
    async fn test_unreachable_api_keeps_key_out_of_error() {
        let p = GeminiProvider::new(
            "gemini-1.5-flash",
            "http://127.0.0.1:9/v1beta",
            Some("AIzaSECRET123".into()),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = p
            .complete("hello", GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Http(_) | ProviderError::Timeout(_)));
        assert!(!err.to_string().contains("AIzaSECRET123"));
    }
}
