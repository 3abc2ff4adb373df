use crate::cli::ConfigCommands;
use crate::config::{MediVoiceConfig, ProviderKind};
use anyhow::Result;
use std::path::Path;

pub fn run(cmd: ConfigCommands, config_path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Validate => validate(config_path),
        ConfigCommands::Show => show(config_path),
    }
}

fn validate(config_path: &Path) -> Result<()> {
    let config = match MediVoiceConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("❌ Failed to parse {}: {:#}", config_path.display(), e);
            std::process::exit(1);
        }
    };

    let errors = config.validate();
    if !errors.is_empty() {
        println!("❌ Validation errors in {}:", config_path.display());
        for e in &errors {
            println!("  - {}", e);
        }
        std::process::exit(1);
    }

    println!("✅ {} is valid.", config_path.display());
    println!();
    for line in summary(&config) {
        println!("{}", line);
    }
    let warnings = readiness_warnings(&config);
    if !warnings.is_empty() {
        println!();
        for w in &warnings {
            println!("⚠️  {}", w);
        }
    }
    Ok(())
}

/// What the server would run with: fallback order, triage tables, speech and integrations.
fn summary(config: &MediVoiceConfig) -> Vec<String> {
    let mut lines = vec!["Provider fallback order:".to_string()];
    for (i, p) in config.providers.iter().enumerate() {
        let kind = match p.kind {
            ProviderKind::OpenaiCompatible => "openai-compatible",
            ProviderKind::Gemini => "gemini",
        };
        lines.push(format!(
            "  {}. {:<10} {:<18} {:<32} {}",
            i + 1,
            p.name,
            kind,
            p.model,
            key_status(p.resolved_key().is_some())
        ));
    }

    lines.push(format!(
        "Triage: {} emergency phrases, {} symptom terms",
        config.triage.emergency_phrases().len(),
        config.triage.symptom_vocabulary().len()
    ));
    lines.push(format!(
        "Knowledge: {} (top {}), seed {}",
        config.knowledge.embedding_model,
        config.knowledge.top_k,
        config
            .knowledge
            .seed_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    ));
    lines.push(format!(
        "Speech: transcription {}, synthesis {} ({})",
        enabled(config.speech.resolved_whisper_key().is_some()),
        enabled(config.speech.resolved_tts_key().is_some()),
        config.speech.voice.voice_name
    ));
    lines.push(format!(
        "Appointment webhook: {}",
        enabled(config.webhook.resolved_url().is_some())
    ));
    lines.push(format!(
        "Telegram bot: {}",
        enabled(config.telegram.resolved_token().is_some())
    ));
    lines.push(format!(
        "Bearer auth: {}",
        enabled(config.security.auth_enabled)
    ));
    lines
}

/// Valid settings that still leave the service degraded.
fn readiness_warnings(config: &MediVoiceConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.providers.iter().all(|p| p.resolved_key().is_none()) {
        warnings.push(
            "No provider has a credential; every answer will be the fallback apology".to_string(),
        );
    }
    if let Some(seed) = &config.knowledge.seed_file {
        if !seed.exists() {
            warnings.push(format!(
                "Seed file {} not found; answers will have no knowledge context",
                seed.display()
            ));
        }
    }
    if config.speech.resolved_whisper_key().is_none() {
        warnings.push("Audio requests will be rejected without a Whisper key".to_string());
    }
    warnings
}

fn key_status(present: bool) -> &'static str {
    if present {
        "key set"
    } else {
        "no key"
    }
}

fn enabled(on: bool) -> &'static str {
    if on {
        "enabled"
    } else {
        "disabled"
    }
}

fn show(config_path: &Path) -> Result<()> {
    let config = MediVoiceConfig::load_or_default(config_path);
    match toml::to_string_pretty(&config) {
        Ok(s) => println!("{}", s),
        Err(e) => anyhow::bail!("Failed to serialize config: {}", e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn offline_config() -> MediVoiceConfig {
        let mut config = MediVoiceConfig::default();
        for p in &mut config.providers {
            p.api_key_env = None;
        }
        config.speech.whisper_api_key_env = String::new();
        config.speech.tts_api_key_env = String::new();
        config.webhook.url_env = String::new();
        config.telegram.bot_token_env = String::new();
        config
    }

    #[test]
    fn test_summary_lists_chain_in_order() {
        let mut config = offline_config();
        config.providers[1].api_key = Some("gsk-test".into());

        let lines = summary(&config);
        assert_eq!(lines[0], "Provider fallback order:");
        assert!(lines[1].contains("1. grok") && lines[1].ends_with("no key"));
        assert!(lines[2].contains("2. groq") && lines[2].ends_with("key set"));
        assert!(lines[3].contains("gemini") && lines[3].ends_with("no key"));
        assert!(!lines.iter().any(|l| l.contains("gsk-test")));
    }

    #[test]
    fn test_summary_reports_triage_and_integrations() {
        let mut config = offline_config();
        config.telegram.bot_token = Some("123:abc".into());

        let lines = summary(&config);
        let triage = format!(
            "Triage: {} emergency phrases, {} symptom terms",
            config.triage.emergency_phrases().len(),
            config.triage.symptom_vocabulary().len()
        );
        assert!(lines.contains(&triage));
        assert!(lines.contains(&"Telegram bot: enabled".to_string()));
        assert!(lines.contains(&"Appointment webhook: disabled".to_string()));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("Speech: transcription disabled, synthesis disabled")));
    }

    #[test]
    fn test_readiness_warnings() {
        let mut config = offline_config();
        config.knowledge.seed_file = Some(PathBuf::from("/nonexistent/medical_knowledge.json"));

        let warnings = readiness_warnings(&config);
        assert_eq!(warnings.len(), 3, "{:?}", warnings);
        assert!(warnings[0].contains("fallback apology"));
        assert!(warnings[1].contains("/nonexistent/medical_knowledge.json"));

        config.providers[0].api_key = Some("xai-test".into());
        config.knowledge.seed_file = None;
        config.speech.whisper_api_key = Some("gsk-whisper".into());
        assert!(readiness_warnings(&config).is_empty());
    }
}
