use medivoice_core::StorageStats;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;

// ── Label types ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ProviderLabel {
    pub provider: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OutcomeLabel {
    pub outcome: String,
}

// ── Metrics registry ───────────────────────────────────────────────────────────

pub struct MediVoiceMetrics {
    pub registry: Registry,

    // Pipeline
    pub interactions: Family<ProviderLabel, Counter>,
    pub emergencies: Counter,
    pub rejected: Family<OutcomeLabel, Counter>,
    pub interaction_duration: Histogram,

    // Side channels
    pub appointments_booked: Counter,
    pub telegram_messages: Counter,

    // Storage gauges, refreshed at scrape time
    pub conversation_count: Gauge,
    pub provider_attempts: Gauge,
    pub failed_provider_attempts: Gauge,
    pub document_count: Gauge,
    pub db_size: Gauge,

    pub uptime_seconds: Gauge,
}

impl MediVoiceMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let interactions: Family<ProviderLabel, Counter> = Family::default();
        registry.register(
            "medivoice_interactions",
            "Completed interactions by provider that answered",
            interactions.clone(),
        );

        let emergencies: Counter = Counter::default();
        registry.register(
            "medivoice_emergencies",
            "Interactions answered by the emergency short-circuit",
            emergencies.clone(),
        );

        let rejected: Family<OutcomeLabel, Counter> = Family::default();
        registry.register(
            "medivoice_interactions_rejected",
            "Interactions that ended in an error, by kind",
            rejected.clone(),
        );

        let interaction_duration =
            Histogram::new([0.05_f64, 0.25, 1.0, 2.5, 5.0, 10.0, 30.0].into_iter());
        registry.register(
            "medivoice_interaction_duration_seconds",
            "End-to-end interaction latency in seconds",
            interaction_duration.clone(),
        );

        let appointments_booked: Counter = Counter::default();
        registry.register(
            "medivoice_appointments_booked",
            "Appointments stored",
            appointments_booked.clone(),
        );

        let telegram_messages: Counter = Counter::default();
        registry.register(
            "medivoice_telegram_messages",
            "Telegram text messages answered",
            telegram_messages.clone(),
        );

        let conversation_count: Gauge = Gauge::default();
        registry.register(
            "medivoice_conversations",
            "Persisted conversations",
            conversation_count.clone(),
        );

        let provider_attempts: Gauge = Gauge::default();
        registry.register(
            "medivoice_provider_attempts",
            "Provider attempts in the call log",
            provider_attempts.clone(),
        );

        let failed_provider_attempts: Gauge = Gauge::default();
        registry.register(
            "medivoice_provider_attempts_failed",
            "Failed provider attempts in the call log",
            failed_provider_attempts.clone(),
        );

        let document_count: Gauge = Gauge::default();
        registry.register(
            "medivoice_knowledge_documents",
            "Indexed knowledge passages",
            document_count.clone(),
        );

        let db_size: Gauge = Gauge::default();
        registry.register("medivoice_db_size_bytes", "Database file size in bytes", db_size.clone());

        let uptime_seconds: Gauge = Gauge::default();
        registry.register(
            "medivoice_uptime_seconds",
            "Server uptime in seconds",
            uptime_seconds.clone(),
        );

        Self {
            registry,
            interactions,
            emergencies,
            rejected,
            interaction_duration,
            appointments_booked,
            telegram_messages,
            conversation_count,
            provider_attempts,
            failed_provider_attempts,
            document_count,
            db_size,
            uptime_seconds,
        }
    }

    pub fn record_interaction(&self, provider: &str, is_emergency: bool, elapsed_secs: f64) {
        self.interactions
            .get_or_create(&ProviderLabel {
                provider: provider.to_string(),
            })
            .inc();
        if is_emergency {
            self.emergencies.inc();
        }
        self.interaction_duration.observe(elapsed_secs);
    }

    pub fn record_rejection(&self, outcome: &str) {
        self.rejected
            .get_or_create(&OutcomeLabel {
                outcome: outcome.to_string(),
            })
            .inc();
    }

    pub fn refresh(&self, stats: &StorageStats, uptime_secs: u64) {
        self.conversation_count.set(stats.conversation_count as i64);
        self.provider_attempts.set(stats.attempt_count as i64);
        self.failed_provider_attempts
            .set(stats.failed_attempt_count as i64);
        self.document_count.set(stats.document_count as i64);
        self.db_size.set(stats.db_size_bytes as i64);
        self.uptime_seconds.set(uptime_secs as i64);
    }

    /// Render in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

impl Default for MediVoiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_recorded_series() {
        let metrics = MediVoiceMetrics::new();
        metrics.record_interaction("groq", false, 0.8);
        metrics.record_interaction("emergency_detection", true, 0.01);
        metrics.record_rejection("client_error");

        let text = metrics.encode().unwrap();
        assert!(text.contains("medivoice_interactions_total{provider=\"groq\"} 1"));
        assert!(text.contains("medivoice_emergencies_total 1"));
        assert!(text.contains("medivoice_interaction_duration_seconds_count 2"));
        assert!(text.contains("outcome=\"client_error\""));
    }
}
