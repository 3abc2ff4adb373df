//! Speech transcoding collaborators.
//!
//! Both directions are best-effort: every failure comes back as
//! [`Outcome::Degraded`](crate::outcome::Outcome) and is never raised into
//! the pipeline as an error.

mod google_tts;
mod whisper;

pub use google_tts::{GoogleTts, VoiceSettings};
pub use whisper::WhisperTranscriber;

use crate::outcome::Outcome;
use async_trait::async_trait;
use std::time::Duration;

/// Upper bound on a single STT or TTS call.
pub const SPEECH_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe encoded audio (webm, mp3, wav...) to text.
    async fn transcribe(&self, audio: &[u8]) -> Outcome<String>;
}

#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize `text` to encoded audio bytes (MP3).
    async fn synthesize(&self, text: &str) -> Outcome<Vec<u8>>;
}

/// Stand-in used when no speech credential is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSpeech;

#[async_trait]
impl SpeechToText for DisabledSpeech {
    async fn transcribe(&self, _audio: &[u8]) -> Outcome<String> {
        Outcome::degraded("speech-to-text is not configured")
    }
}

#[async_trait]
impl TextToSpeech for DisabledSpeech {
    async fn synthesize(&self, _text: &str) -> Outcome<Vec<u8>> {
        Outcome::degraded("text-to-speech is not configured")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_speech_degrades() {
        assert!(!DisabledSpeech.transcribe(b"RIFF").await.is_ready());
        assert!(!DisabledSpeech.synthesize("hello").await.is_ready());
    }
}
