use crate::outcome::Outcome;
use crate::speech::{TextToSpeech, SPEECH_TIMEOUT};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const GOOGLE_TTS_BASE_URL: &str = "https://texttospeech.googleapis.com/v1";

/// Voice selection and audio shaping sent with every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoiceSettings {
    pub language_code: String,
    pub voice_name: String,
    pub speaking_rate: f32,
    pub pitch: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            language_code: "en-GB".to_string(),
            voice_name: "en-GB-Standard-A".to_string(),
            speaking_rate: 0.95,
            pitch: 0.0,
        }
    }
}

/// Google Cloud Text-to-Speech over REST, authenticated with an API key.
pub struct GoogleTts {
    api_key: String,
    base_url: String,
    voice: VoiceSettings,
    client: reqwest::Client,
}

impl GoogleTts {
    pub fn new(api_key: impl Into<String>, voice: VoiceSettings) -> reqwest::Result<Self> {
        Self::with_endpoint(api_key, voice, GOOGLE_TTS_BASE_URL)
    }

    pub fn with_endpoint(
        api_key: impl Into<String>,
        voice: VoiceSettings,
        base_url: impl Into<String>,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(SPEECH_TIMEOUT).build()?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            voice,
            client,
        })
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        json!({
            "input": {"text": text},
            "voice": {
                "languageCode": self.voice.language_code,
                "name": self.voice.voice_name,
                "ssmlGender": "FEMALE",
            },
            "audioConfig": {
                "audioEncoding": "MP3",
                "speakingRate": self.voice.speaking_rate,
                "pitch": self.voice.pitch,
            },
        })
    }

    async fn request(&self, text: &str) -> Result<Vec<u8>, String> {
        let response = self
            .client
            .post(format!("{}/text:synthesize", self.base_url))
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&self.request_body(text))
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        let body: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| format!("malformed response: {}", e.without_url()))?;
        decode_audio(&body.audio_content)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

fn decode_audio(encoded: &str) -> Result<Vec<u8>, String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| format!("invalid audioContent: {}", e))?;
    if bytes.is_empty() {
        return Err("empty audioContent".to_string());
    }
    Ok(bytes)
}

#[async_trait]
impl TextToSpeech for GoogleTts {
    async fn synthesize(&self, text: &str) -> Outcome<Vec<u8>> {
        match self.request(text).await {
            Ok(audio) => {
                log::info!(
                    "TTS generated for text: {}...",
                    text.chars().take(50).collect::<String>()
                );
                Outcome::Ready(audio)
            }
            Err(e) => {
                log::error!("TTS synthesis failed: {}", e);
                Outcome::degraded(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_uses_voice_settings() {
        let tts = GoogleTts::new("key", VoiceSettings::default()).unwrap();
        let body = tts.request_body("Drink water");
        assert_eq!(body["input"]["text"], "Drink water");
        assert_eq!(body["voice"]["name"], "en-GB-Standard-A");
        assert_eq!(body["audioConfig"]["audioEncoding"], "MP3");
    }

    #[test]
    fn test_decode_audio() {
        assert_eq!(decode_audio("SUQz").unwrap(), b"ID3".to_vec());
        assert!(decode_audio("").is_err());
        assert!(decode_audio("***").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_degraded() {
        let tts =
            GoogleTts::with_endpoint("key", VoiceSettings::default(), "http://127.0.0.1:9").unwrap();
        assert!(!tts.synthesize("hello").await.is_ready());
    }

    #[tokio::test]
    async fn test_degraded_reason_keeps_key_out() {
        let tts = GoogleTts::with_endpoint(
            "AIzaTTSSECRET",
            VoiceSettings::default(),
            "http://127.0.0.1:9",
        )
        .unwrap();
        match tts.synthesize("hello").await {
            Outcome::Degraded { reason } => {
                assert!(reason.starts_with("request failed"));
                assert!(!reason.contains("AIzaTTSSECRET"));
            }
            Outcome::Ready(_) => panic!("expected degraded synthesis"),
        }
    }
}
