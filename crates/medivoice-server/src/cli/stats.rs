use crate::config::MediVoiceConfig;
use anyhow::Result;
use medivoice_core::{RedbStorage, Storage};

pub fn run(config: &MediVoiceConfig) -> Result<()> {
    let storage = RedbStorage::open(config.db_path())?;
    let stats = storage.stats()?;

    let db_mb = stats.db_size_bytes as f64 / 1_048_576.0;

    println!();
    println!("MediVoice Overview");
    println!("{}", "─".repeat(50));
    println!("Conversations:      {:>8}", stats.conversation_count);
    println!("  emergencies       {:>8}", stats.emergency_count);
    println!("Provider attempts:  {:>8}", stats.attempt_count);
    println!("  failed            {:>8}", stats.failed_attempt_count);
    println!("Knowledge passages: {:>8}", stats.document_count);
    println!("Appointments:       {:>8}", stats.appointment_count);
    println!("DB Size:            {:>7.1} MB", db_mb);
    println!("{}", "─".repeat(50));
    println!();

    Ok(())
}
