use crate::outcome::Outcome;
use crate::speech::{SpeechToText, SPEECH_TIMEOUT};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

pub const GROQ_AUDIO_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Whisper transcription through Groq's OpenAI-compatible audio endpoint.
pub struct WhisperTranscriber {
    api_key: String,
    base_url: String,
    model: String,
    language: String,
    client: reqwest::Client,
}

impl WhisperTranscriber {
    pub fn new(api_key: impl Into<String>) -> reqwest::Result<Self> {
        Self::with_endpoint(api_key, GROQ_AUDIO_BASE_URL)
    }

    pub fn with_endpoint(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(SPEECH_TIMEOUT).build()?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: "whisper-large-v3".to_string(),
            language: "en".to_string(),
            client,
        })
    }

    async fn request(&self, audio: &[u8]) -> Result<String, String> {
        let file = Part::bytes(audio.to_vec())
            .file_name("audio.webm")
            .mime_str("audio/webm")
            .map_err(|e| e.to_string())?;

        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "text");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read body: {}", e.without_url()))?;

        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }
        Ok(body.trim().to_string())
    }
}

#[async_trait]
impl SpeechToText for WhisperTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Outcome<String> {
        if audio.is_empty() {
            return Outcome::degraded("empty audio");
        }

        match self.request(audio).await {
            Ok(text) if text.is_empty() => {
                log::warn!("STT returned an empty transcription");
                Outcome::degraded("empty transcription")
            }
            Ok(text) => {
                log::info!(
                    "Audio transcribed successfully: {}...",
                    text.chars().take(50).collect::<String>()
                );
                Outcome::Ready(text)
            }
            Err(e) => {
                log::error!("STT transcription failed: {}", e);
                Outcome::degraded(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_audio_is_degraded_without_a_request() {
        let stt = WhisperTranscriber::with_endpoint("key", "http://127.0.0.1:9").unwrap();
        assert_eq!(stt.transcribe(&[]).await, Outcome::degraded("empty audio"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_degraded() {
        let stt = WhisperTranscriber::with_endpoint("key", "http://127.0.0.1:9").unwrap();
        assert!(!stt.transcribe(b"not really audio").await.is_ready());
    }
}
