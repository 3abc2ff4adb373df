use serde::{Deserialize, Serialize};

/// High-risk phrases, checked in this order.
pub const DEFAULT_EMERGENCY_PHRASES: &[&str] = &[
    "severe bleeding",
    "heavy bleeding",
    "blood",
    "chest pain",
    "heart attack",
    "stroke",
    "can't breathe",
    "cannot breathe",
    "difficulty breathing",
    "unconscious",
    "passed out",
    "seizure",
    "severe pain",
    "extreme pain",
    "unbearable pain",
    "poisoning",
    "overdose",
    "suicide",
    "severe injury",
    "broken bone",
    "accident",
];

/// Canonical symptom tokens, reported in this order.
pub const DEFAULT_SYMPTOM_VOCABULARY: &[&str] = &[
    "fever",
    "headache",
    "pain",
    "cough",
    "vomiting",
    "diarrhea",
    "nausea",
    "fatigue",
    "weakness",
    "dizzy",
    "chills",
    "sweating",
    "bleeding",
    "rash",
    "swelling",
    "aching",
    "sore throat",
    "runny nose",
    "congestion",
    "shortness of breath",
    "chest pain",
    "abdominal pain",
    "stomach pain",
    "back pain",
    "joint pain",
    "muscle pain",
    "body aches",
    "loss of appetite",
    "weight loss",
];

/// Phrase lists driving triage, as loaded from the `[triage]` config section.
///
/// Entries are lower-cased and blank entries dropped on construction; order
/// is preserved and is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawKeywordTable")]
pub struct KeywordTable {
    emergency_phrases: Vec<String>,
    symptom_vocabulary: Vec<String>,
}

#[derive(Deserialize)]
struct RawKeywordTable {
    #[serde(default = "default_emergency")]
    emergency_phrases: Vec<String>,
    #[serde(default = "default_symptoms")]
    symptom_vocabulary: Vec<String>,
}

fn default_emergency() -> Vec<String> {
    DEFAULT_EMERGENCY_PHRASES.iter().map(|s| s.to_string()).collect()
}

fn default_symptoms() -> Vec<String> {
    DEFAULT_SYMPTOM_VOCABULARY.iter().map(|s| s.to_string()).collect()
}

impl From<RawKeywordTable> for KeywordTable {
    fn from(raw: RawKeywordTable) -> Self {
        Self::new(raw.emergency_phrases, raw.symptom_vocabulary)
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new(default_emergency(), default_symptoms())
    }
}

impl KeywordTable {
    pub fn new(emergency_phrases: Vec<String>, symptom_vocabulary: Vec<String>) -> Self {
        Self {
            emergency_phrases: normalise(emergency_phrases),
            symptom_vocabulary: normalise(symptom_vocabulary),
        }
    }

    pub fn emergency_phrases(&self) -> &[String] {
        &self.emergency_phrases
    }

    pub fn symptom_vocabulary(&self) -> &[String] {
        &self.symptom_vocabulary
    }
}

fn normalise(entries: Vec<String>) -> Vec<String> {
    entries
        .into_iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
