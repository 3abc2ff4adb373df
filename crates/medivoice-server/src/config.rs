use anyhow::Context;
use medivoice_core::{KeywordTable, VoiceSettings, SUPPORTED_EMBEDDING_MODELS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Top-level `medivoice.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediVoiceConfig {
    pub server: ServerConfig,
    pub speech: SpeechConfig,
    pub knowledge: KnowledgeConfig,
    pub triage: KeywordTable,
    pub webhook: WebhookConfig,
    pub telegram: TelegramConfig,
    pub security: SecurityConfig,
    /// Inference providers in fallback order.
    pub providers: Vec<ProviderConfig>,
}

impl Default for MediVoiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            speech: SpeechConfig::default(),
            knowledge: KnowledgeConfig::default(),
            triage: KeywordTable::default(),
            webhook: WebhookConfig::default(),
            telegram: TelegramConfig::default(),
            security: SecurityConfig::default(),
            providers: default_providers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub app_name: String,
    pub http_addr: String,
    pub data_dir: PathBuf,
    /// CORS origins; `"*"` allows any.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app_name: "MediVoice GH".to_string(),
            http_addr: "0.0.0.0:8000".to_string(),
            data_dir: PathBuf::from("./data"),
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenaiCompatible,
    Gemini,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn resolved_key(&self) -> Option<String> {
        resolve_secret(&self.api_key, self.api_key_env.as_deref())
    }
}

fn default_provider_timeout() -> u64 {
    30
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "grok".into(),
            kind: ProviderKind::OpenaiCompatible,
            model: "grok-beta".into(),
            base_url: Some("https://api.x.ai/v1".into()),
            api_key: None,
            api_key_env: Some("XAI_API_KEY".into()),
            timeout_secs: default_provider_timeout(),
        },
        ProviderConfig {
            name: "groq".into(),
            kind: ProviderKind::OpenaiCompatible,
            model: "llama-3.1-70b-versatile".into(),
            base_url: Some("https://api.groq.com/openai/v1".into()),
            api_key: None,
            api_key_env: Some("GROQ_API_KEY".into()),
            timeout_secs: default_provider_timeout(),
        },
        ProviderConfig {
            name: "gemini".into(),
            kind: ProviderKind::Gemini,
            model: "gemini-1.5-flash".into(),
            base_url: Some("https://generativelanguage.googleapis.com/v1beta".into()),
            api_key: None,
            api_key_env: Some("GOOGLE_API_KEY".into()),
            timeout_secs: default_provider_timeout(),
        },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub whisper_api_key: Option<String>,
    pub whisper_api_key_env: String,
    pub tts_api_key: Option<String>,
    pub tts_api_key_env: String,
    pub voice: VoiceSettings,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            whisper_api_key: None,
            whisper_api_key_env: "GROQ_WHISPER_API_KEY".to_string(),
            tts_api_key: None,
            tts_api_key_env: "GOOGLE_TTS_API_KEY".to_string(),
            voice: VoiceSettings::default(),
        }
    }
}

impl SpeechConfig {
    pub fn resolved_whisper_key(&self) -> Option<String> {
        resolve_secret(&self.whisper_api_key, Some(&self.whisper_api_key_env))
    }

    pub fn resolved_tts_key(&self) -> Option<String> {
        resolve_secret(&self.tts_api_key, Some(&self.tts_api_key_env))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// JSON seed file loaded at startup when the store is empty.
    pub seed_file: Option<PathBuf>,
    pub top_k: usize,
    pub embedding_model: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            seed_file: Some(PathBuf::from("data/medical_knowledge.json")),
            top_k: medivoice_core::pipeline::DEFAULT_TOP_K,
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: Option<String>,
    pub url_env: String,
    pub api_key: Option<String>,
    pub api_key_env: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            url_env: "N8N_WEBHOOK_URL".to_string(),
            api_key: None,
            api_key_env: "N8N_API_KEY".to_string(),
        }
    }
}

impl WebhookConfig {
    pub fn resolved_url(&self) -> Option<String> {
        resolve_secret(&self.url, Some(&self.url_env))
    }

    pub fn resolved_key(&self) -> Option<String> {
        resolve_secret(&self.api_key, Some(&self.api_key_env))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub bot_token_env: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            bot_token_env: "TELEGRAM_BOT_TOKEN".to_string(),
        }
    }
}

impl TelegramConfig {
    pub fn resolved_token(&self) -> Option<String> {
        resolve_secret(&self.bot_token, Some(&self.bot_token_env))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub auth_enabled: bool,
    pub auth_token: Option<String>,
}

impl SecurityConfig {
    /// Config value first, then `MEDIVOICE_AUTH_TOKEN`.
    pub fn resolved_token(&self) -> Option<String> {
        resolve_secret(&self.auth_token, Some("MEDIVOICE_AUTH_TOKEN"))
    }
}

/// A non-empty config value wins; otherwise the named environment variable.
fn resolve_secret(value: &Option<String>, env: Option<&str>) -> Option<String> {
    value
        .clone()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| {
            env.filter(|e| !e.is_empty())
                .and_then(|e| std::env::var(e).ok())
                .filter(|v| !v.trim().is_empty())
        })
}

impl MediVoiceConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.server.data_dir.join("medivoice.redb")
    }

    pub fn http_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .http_addr
            .parse()
            .with_context(|| format!("invalid http_addr {:?}", self.server.http_addr))
    }

    /// Human-readable problems; empty when the config is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "[server] http_addr {:?} is not a socket address",
                self.server.http_addr
            ));
        }

        let mut seen = HashSet::new();
        for (i, p) in self.providers.iter().enumerate() {
            if p.name.trim().is_empty() {
                errors.push(format!("[[providers]] entry {} has an empty name", i + 1));
            } else if !seen.insert(p.name.as_str()) {
                errors.push(format!("[[providers]] name {:?} is used more than once", p.name));
            }
            if p.model.trim().is_empty() {
                errors.push(format!("[[providers]] {:?} has an empty model", p.name));
            }
            if let Some(url) = &p.base_url {
                if !is_http_url(url) {
                    errors.push(format!("[[providers]] {:?} base_url must be http(s)", p.name));
                }
            }
            if p.timeout_secs == 0 {
                errors.push(format!("[[providers]] {:?} timeout_secs must be > 0", p.name));
            }
        }

        if self.knowledge.top_k == 0 {
            errors.push("[knowledge] top_k must be at least 1".to_string());
        }
        if !SUPPORTED_EMBEDDING_MODELS.contains(&self.knowledge.embedding_model.as_str()) {
            errors.push(format!(
                "[knowledge] embedding_model {:?} is not supported",
                self.knowledge.embedding_model
            ));
        }

        if self.triage.emergency_phrases().is_empty() {
            errors.push("[triage] emergency_phrases must not be empty".to_string());
        }

        let rate = self.speech.voice.speaking_rate;
        if !(0.25..=4.0).contains(&rate) {
            errors.push(format!(
                "[speech.voice] speaking_rate {} is outside 0.25..=4.0",
                rate
            ));
        }

        if let Some(url) = &self.webhook.url {
            if !url.is_empty() && !is_http_url(url) {
                errors.push("[webhook] url must be http(s)".to_string());
            }
        }

        if self.security.auth_enabled && self.security.resolved_token().is_none() {
            errors.push(
                "[security] auth_enabled = true but no auth_token or MEDIVOICE_AUTH_TOKEN"
                    .to_string(),
            );
        }

        errors
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
