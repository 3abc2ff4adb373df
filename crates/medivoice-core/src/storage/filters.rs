/// Filter criteria for listing conversations. Results are newest first.
#[derive(Debug, Clone, Default)]
pub struct ConversationFilter {
    pub emergency_only: bool,
    pub provider: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ConversationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only conversations that took the emergency short-circuit
    pub fn emergencies(mut self) -> Self {
        self.emergency_only = true;
        self
    }

    /// Only conversations answered by this provider id
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Row counts across the database
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StorageStats {
    pub conversation_count: u64,
    pub emergency_count: u64,
    pub attempt_count: u64,
    pub failed_attempt_count: u64,
    pub document_count: u64,
    pub appointment_count: u64,
    pub db_size_bytes: u64,
}
