use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a persisted conversation. UUIDv7 for time-sortability.
pub type ConversationId = Uuid;

/// Identifier of an indexed knowledge passage.
pub type DocumentId = Uuid;

/// Identifier of a booked appointment.
pub type AppointmentId = Uuid;

/// Type alias for embedding vectors
pub type Embedding = Vec<f32>;

/// Canonical symptom tokens in vocabulary order.
pub type SymptomList = Vec<String>;

/// Provider id recorded when the emergency short-circuit answered.
pub const EMERGENCY_PROVIDER: &str = "emergency_detection";

/// Provider id recorded when every inference provider failed.
pub const NO_PROVIDER: &str = "none";

/// Label used for knowledge passages that carry no source.
pub const DEFAULT_SOURCE_LABEL: &str = "Medical Database";

/// What the caller handed us. Audio takes precedence over text.
#[derive(Debug, Clone, Default)]
pub struct InteractionInput {
    pub audio: Option<Vec<u8>>,
    pub text: Option<String>,
}

impl InteractionInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            audio: None,
            text: Some(text.into()),
        }
    }

    pub fn audio(bytes: Vec<u8>) -> Self {
        Self {
            audio: Some(bytes),
            text: None,
        }
    }

    pub fn has_audio(&self) -> bool {
        self.audio.as_ref().is_some_and(|a| !a.is_empty())
    }
}

/// An indexed medical-knowledge passage. Immutable once indexed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeDocument {
    pub id: DocumentId,
    pub text: String,
    pub source: Option<String>,
    pub embedding: Embedding,
    pub created_at: DateTime<Utc>,
}

impl KnowledgeDocument {
    pub fn new(text: String, source: Option<String>, embedding: Embedding) -> Self {
        Self {
            id: Uuid::now_v7(),
            text,
            source,
            embedding,
            created_at: Utc::now(),
        }
    }

    pub fn source_label(&self) -> &str {
        self.source
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SOURCE_LABEL)
    }
}

/// One call to one inference provider. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderAttempt {
    pub provider: String,
    pub model: String,
    pub latency_ms: u64,
    pub success: bool,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProviderAttempt {
    pub fn succeeded(provider: &str, model: &str, latency_ms: u64) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            latency_ms,
            success: true,
            error: None,
            created_at: Utc::now(),
        }
    }

    pub fn failed(provider: &str, model: &str, latency_ms: u64, error: String) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            latency_ms,
            success: false,
            error: Some(error),
            created_at: Utc::now(),
        }
    }
}

/// The persisted result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationRecord {
    pub id: ConversationId,
    pub user_message: String,
    /// Present only when the message came from audio.
    pub transcription: Option<String>,
    pub symptoms_detected: SymptomList,
    pub ai_response: String,
    pub is_emergency: bool,
    pub provider_used: String,
    pub response_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl ConversationRecord {
    pub fn new(
        user_message: String,
        transcription: Option<String>,
        symptoms_detected: SymptomList,
        ai_response: String,
        is_emergency: bool,
        provider_used: String,
        response_time_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_message,
            transcription,
            symptoms_detected,
            ai_response,
            is_emergency,
            provider_used,
            response_time_ms,
            created_at: Utc::now(),
        }
    }
}

/// Lifecycle of a booked appointment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

/// Fields a caller supplies when booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentRequest {
    pub full_name: String,
    pub phone: String,
    pub preferred_date: String,
    pub preferred_time: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: AppointmentId,
    pub full_name: String,
    pub phone: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    /// Raw JSON body returned by the booking webhook, if it answered 200.
    /// Kept as text because bincode cannot round-trip `serde_json::Value`.
    pub webhook_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn from_request(req: AppointmentRequest) -> Self {
        Self {
            id: Uuid::now_v7(),
            full_name: req.full_name,
            phone: req.phone,
            preferred_date: req.preferred_date,
            preferred_time: req.preferred_time,
            reason: req.reason,
            status: AppointmentStatus::Pending,
            webhook_response: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_label_defaults() {
        let doc = KnowledgeDocument::new("Malaria is spread by mosquitoes".into(), None, vec![]);
        assert_eq!(doc.source_label(), DEFAULT_SOURCE_LABEL);

        let doc = KnowledgeDocument::new("x".into(), Some(String::new()), vec![]);
        assert_eq!(doc.source_label(), DEFAULT_SOURCE_LABEL);

        let doc = KnowledgeDocument::new("x".into(), Some("WHO".into()), vec![]);
        assert_eq!(doc.source_label(), "WHO");
    }

    #[test]
    fn test_has_audio_ignores_empty_bytes() {
        assert!(!InteractionInput::audio(vec![]).has_audio());
        assert!(InteractionInput::audio(vec![1, 2, 3]).has_audio());
        assert!(!InteractionInput::text("hello").has_audio());
    }

    #[test]
    fn test_attempt_constructors() {
        let ok = ProviderAttempt::succeeded("groq", "llama", 12);
        assert!(ok.success);
        assert!(ok.error.is_none());

        let bad = ProviderAttempt::failed("grok", "grok-beta", 5, "HTTP 503".into());
        assert!(!bad.success);
        assert_eq!(bad.error.as_deref(), Some("HTTP 503"));
    }

    #[test]
    fn test_appointment_starts_pending() {
        let appt = Appointment::from_request(AppointmentRequest {
            full_name: "Ama Mensah".into(),
            phone: "+233201234567".into(),
            preferred_date: "2026-11-02".into(),
            preferred_time: "10:00".into(),
            reason: None,
        });
        assert_eq!(appt.status, AppointmentStatus::Pending);
        assert!(appt.webhook_response.is_none());
    }
}
