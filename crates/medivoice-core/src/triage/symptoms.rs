use crate::triage::KeywordTable;
use crate::types::SymptomList;

/// Pulls canonical symptom tokens out of free text.
#[derive(Debug, Clone, Default)]
pub struct SymptomExtractor {
    table: KeywordTable,
}

impl SymptomExtractor {
    pub fn new(table: KeywordTable) -> Self {
        Self { table }
    }

    /// Every vocabulary term found in `text`, in vocabulary order.
    pub fn extract(&self, text: &str) -> SymptomList {
        let lowered = text.to_lowercase();
        self.table
            .symptom_vocabulary()
            .iter()
            .filter(|term| lowered.contains(term.as_str()))
            .cloned()
            .collect()
    }
}
