use crate::cli::HistoryArgs;
use crate::config::MediVoiceConfig;
use anyhow::Result;
use medivoice_core::{ConversationFilter, RedbStorage, Storage};

const MESSAGE_WIDTH: usize = 48;

pub fn run(args: HistoryArgs, config: &MediVoiceConfig) -> Result<()> {
    let storage = RedbStorage::open(config.db_path())?;

    let mut filter = ConversationFilter::new().with_limit(args.limit);
    if args.emergencies {
        filter = filter.emergencies();
    }
    let records = storage.list_conversations(filter)?;

    if records.is_empty() {
        println!("No conversations yet.");
        return Ok(());
    }

    println!();
    println!(
        "{:<20} {:<20} {:>7}  {}",
        "When", "Provider", "ms", "Message"
    );
    println!("{}", "─".repeat(100));
    for record in &records {
        let flag = if record.is_emergency { "🚨 " } else { "" };
        println!(
            "{:<20} {:<20} {:>7}  {}{}",
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.provider_used,
            record.response_time_ms,
            flag,
            truncate(&record.user_message, MESSAGE_WIDTH)
        );
    }
    println!("{}", "─".repeat(100));
    println!("{} conversation(s)", records.len());
    println!();

    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= width {
        return single_line;
    }
    let cut: String = single_line.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a\nb", 10), "a b");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
