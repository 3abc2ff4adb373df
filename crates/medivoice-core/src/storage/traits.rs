use crate::error::Result;
use crate::storage::filters::{ConversationFilter, StorageStats};
use crate::types::{
    Appointment, AppointmentId, ConversationId, ConversationRecord, KnowledgeDocument,
    ProviderAttempt,
};

/// Append-only sink for provider attempts.
///
/// Split out from [`Storage`] so the fallback chain depends on nothing else.
pub trait CallLog: Send + Sync {
    /// Append one attempt. Entries are never updated or removed.
    fn append_attempt(&self, attempt: &ProviderAttempt) -> Result<()>;
}

/// Persistence for everything the pipeline and the HTTP surface touch
pub trait Storage: CallLog {
    // === Conversations ===

    /// Persist a finished pipeline run and return its id
    fn save_conversation(&self, record: &ConversationRecord) -> Result<ConversationId>;

    /// Retrieve a conversation by ID
    fn get_conversation(&self, id: ConversationId) -> Result<Option<ConversationRecord>>;

    /// List conversations, newest first
    fn list_conversations(&self, filter: ConversationFilter) -> Result<Vec<ConversationRecord>>;

    // === Call log ===

    /// Most recent provider attempts, newest first
    fn list_attempts(&self, limit: usize) -> Result<Vec<ProviderAttempt>>;

    // === Knowledge ===

    /// Insert documents in a single transaction. No deduplication.
    fn put_documents(&self, docs: &[KnowledgeDocument]) -> Result<()>;

    /// All indexed documents in insertion order
    fn list_documents(&self) -> Result<Vec<KnowledgeDocument>>;

    fn count_documents(&self) -> Result<u64>;

    // === Appointments ===

    /// Store an appointment (insert or update)
    fn put_appointment(&self, appointment: &Appointment) -> Result<()>;

    fn get_appointment(&self, id: AppointmentId) -> Result<Option<Appointment>>;

    /// List appointments, newest first
    fn list_appointments(&self, limit: Option<usize>) -> Result<Vec<Appointment>>;

    // === Maintenance ===

    fn stats(&self) -> Result<StorageStats>;
}
