use crate::error::{MediVoiceError, Result};
use crate::storage::filters::{ConversationFilter, StorageStats};
use crate::storage::traits::{CallLog, Storage};
use crate::types::{
    Appointment, AppointmentId, ConversationId, ConversationRecord, KnowledgeDocument,
    ProviderAttempt,
};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// UUID-keyed table of bincode blobs
type UuidTable = TableDefinition<'static, &'static [u8; 16], &'static [u8]>;

// Table definitions
const CONVERSATIONS: UuidTable = TableDefinition::new("conversations");
const DOCUMENTS: UuidTable = TableDefinition::new("knowledge_documents");
const APPOINTMENTS: UuidTable = TableDefinition::new("appointments");

// Call log: key is (timestamp_nanos << 32 | seq) for time-ordered iteration
const PROVIDER_ATTEMPTS: TableDefinition<u128, &[u8]> = TableDefinition::new("provider_attempts");

// Metadata table
const META: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;
const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Redb-based storage implementation
pub struct RedbStorage {
    db: Arc<Database>,
    path: PathBuf,
    /// Disambiguates call-log entries written within the same nanosecond.
    attempt_seq: AtomicU64,
}

impl RedbStorage {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let is_new = !path.exists();
        let db = Database::create(&path)?;

        if !is_new {
            Self::check_schema_version(&db)?;
        }

        // Ensure tables exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CONVERSATIONS)?;
            let _ = write_txn.open_table(DOCUMENTS)?;
            let _ = write_txn.open_table(APPOINTMENTS)?;
            let _ = write_txn.open_table(PROVIDER_ATTEMPTS)?;
            let mut meta = write_txn.open_table(META)?;
            if is_new {
                meta.insert(
                    SCHEMA_VERSION_KEY,
                    CURRENT_SCHEMA_VERSION.to_string().as_bytes(),
                )?;
            }
        }
        write_txn.commit()?;

        Ok(Self {
            db: Arc::new(db),
            path,
            attempt_seq: AtomicU64::new(0),
        })
    }

    /// Check schema version. Returns error if the file was written by another version.
    fn check_schema_version(db: &Database) -> Result<()> {
        let read_txn = db.begin_read()?;
        let version = {
            let table = read_txn.open_table(META).ok();
            table.and_then(|t| {
                t.get(SCHEMA_VERSION_KEY).ok().flatten().and_then(|v| {
                    std::str::from_utf8(v.value())
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok())
                })
            })
        };

        match version {
            // Created but never initialised (crashed mid-open); tables are created below
            None => Ok(()),
            Some(v) if v == CURRENT_SCHEMA_VERSION => Ok(()),
            Some(v) => Err(MediVoiceError::Validation(format!(
                "Database schema v{} does not match this binary (v{})",
                v, CURRENT_SCHEMA_VERSION
            ))),
        }
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn uuid_to_bytes(id: &uuid::Uuid) -> [u8; 16] {
        *id.as_bytes()
    }

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value).map_err(MediVoiceError::from)
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes).map_err(MediVoiceError::from)
    }

    fn put_keyed<T: Serialize>(
        &self,
        table: UuidTable,
        id: &uuid::Uuid,
        value: &T,
    ) -> Result<()> {
        let bytes = Self::encode(value)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut t = write_txn.open_table(table)?;
            t.insert(&Self::uuid_to_bytes(id), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_keyed<T: DeserializeOwned>(
        &self,
        table: UuidTable,
        id: &uuid::Uuid,
    ) -> Result<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(table)?;
        match t.get(&Self::uuid_to_bytes(id))? {
            Some(bytes) => Ok(Some(Self::decode(bytes.value())?)),
            None => Ok(None),
        }
    }

    fn attempt_key(&self, attempt: &ProviderAttempt) -> u128 {
        let nanos = attempt.created_at.timestamp_nanos_opt().unwrap_or(0).max(0) as u128;
        let seq = self.attempt_seq.fetch_add(1, Ordering::Relaxed) as u128;
        (nanos << 32) | (seq & 0xFFFF_FFFF)
    }
}

impl CallLog for RedbStorage {
    fn append_attempt(&self, attempt: &ProviderAttempt) -> Result<()> {
        let key = self.attempt_key(attempt);
        let value = serde_json::to_vec(attempt)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PROVIDER_ATTEMPTS)?;
            table.insert(key, value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl Storage for RedbStorage {
    fn save_conversation(&self, record: &ConversationRecord) -> Result<ConversationId> {
        self.put_keyed(CONVERSATIONS, &record.id, record)?;
        Ok(record.id)
    }

    fn get_conversation(&self, id: ConversationId) -> Result<Option<ConversationRecord>> {
        self.get_keyed(CONVERSATIONS, &id)
    }

    fn list_conversations(&self, filter: ConversationFilter) -> Result<Vec<ConversationRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONVERSATIONS)?;

        let offset = filter.offset.unwrap_or(0);
        let mut skipped = 0usize;
        let mut records = Vec::new();

        // UUIDv7 keys sort by creation time, so reverse iteration is newest first
        for item in table.iter()?.rev() {
            let (_, value) = item?;
            let record: ConversationRecord = Self::decode(value.value())?;

            if filter.emergency_only && !record.is_emergency {
                continue;
            }
            if let Some(ref provider) = filter.provider {
                if record.provider_used != *provider {
                    continue;
                }
            }
            if skipped < offset {
                skipped += 1;
                continue;
            }

            records.push(record);
            if let Some(limit) = filter.limit {
                if records.len() >= limit {
                    break;
                }
            }
        }

        Ok(records)
    }

    fn list_attempts(&self, limit: usize) -> Result<Vec<ProviderAttempt>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROVIDER_ATTEMPTS)?;

        let mut attempts = Vec::new();
        for item in table.iter()?.rev() {
            let (_, value) = item?;
            let attempt = match serde_json::from_slice::<ProviderAttempt>(value.value()) {
                Ok(a) => a,
                Err(_) => continue, // skip corrupt entries
            };
            attempts.push(attempt);
            if attempts.len() >= limit {
                break;
            }
        }
        Ok(attempts)
    }

    fn put_documents(&self, docs: &[KnowledgeDocument]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(DOCUMENTS)?;
            for doc in docs {
                let bytes = Self::encode(doc)?;
                table.insert(&Self::uuid_to_bytes(&doc.id), bytes.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn list_documents(&self) -> Result<Vec<KnowledgeDocument>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS)?;

        let mut docs = Vec::new();
        for item in table.iter()? {
            let (_, value) = item?;
            docs.push(Self::decode(value.value())?);
        }
        Ok(docs)
    }

    fn count_documents(&self) -> Result<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS)?;
        Ok(table.iter()?.count() as u64)
    }

    fn put_appointment(&self, appointment: &Appointment) -> Result<()> {
        if appointment.full_name.trim().is_empty() || appointment.phone.trim().is_empty() {
            return Err(MediVoiceError::Validation(
                "Appointment requires a name and phone number".to_string(),
            ));
        }
        self.put_keyed(APPOINTMENTS, &appointment.id, appointment)
    }

    fn get_appointment(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        self.get_keyed(APPOINTMENTS, &id)
    }

    fn list_appointments(&self, limit: Option<usize>) -> Result<Vec<Appointment>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(APPOINTMENTS)?;

        let mut appointments = Vec::new();
        for item in table.iter()?.rev() {
            let (_, value) = item?;
            appointments.push(Self::decode(value.value())?);
            if limit.is_some_and(|l| appointments.len() >= l) {
                break;
            }
        }
        Ok(appointments)
    }

    fn stats(&self) -> Result<StorageStats> {
        let read_txn = self.db.begin_read()?;

        let mut stats = StorageStats::default();

        {
            let table = read_txn.open_table(CONVERSATIONS)?;
            for item in table.iter()? {
                let (_, value) = item?;
                let record: ConversationRecord = Self::decode(value.value())?;
                stats.conversation_count += 1;
                if record.is_emergency {
                    stats.emergency_count += 1;
                }
            }
        }

        {
            let table = read_txn.open_table(PROVIDER_ATTEMPTS)?;
            for item in table.iter()? {
                let (_, value) = item?;
                stats.attempt_count += 1;
                if let Ok(attempt) = serde_json::from_slice::<ProviderAttempt>(value.value()) {
                    if !attempt.success {
                        stats.failed_attempt_count += 1;
                    }
                }
            }
        }

        stats.document_count = read_txn.open_table(DOCUMENTS)?.iter()?.count() as u64;
        stats.appointment_count = read_txn.open_table(APPOINTMENTS)?.iter()?.count() as u64;
        stats.db_size_bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        Ok(stats)
    }
}
