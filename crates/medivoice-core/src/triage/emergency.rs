use crate::triage::KeywordTable;

/// Flags input containing a life-threatening phrase.
#[derive(Debug, Clone, Default)]
pub struct EmergencyDetector {
    table: KeywordTable,
}

impl EmergencyDetector {
    pub fn new(table: KeywordTable) -> Self {
        Self { table }
    }

    pub fn classify(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    /// The first configured phrase found in `text`, in declaration order.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.table
            .emergency_phrases()
            .iter()
            .find(|phrase| lowered.contains(phrase.as_str()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::DEFAULT_EMERGENCY_PHRASES;
    use proptest::prelude::*;

    #[test]
    fn test_breathing_and_chest_pain() {
        let detector = EmergencyDetector::default();
        let text = "I can't breathe and have chest pain";
        assert!(detector.classify(text));
        // "chest pain" is declared before "can't breathe"
        assert_eq!(detector.first_match(text), Some("chest pain"));
    }

    #[test]
    fn test_ordinary_complaint_is_not_emergency() {
        let detector = EmergencyDetector::default();
        assert!(!detector.classify("I have a fever and a headache"));
        assert!(!detector.classify(""));
    }

    #[test]
    fn test_negation_still_matches() {
        assert!(EmergencyDetector::default().classify("no chest pain today"));
    }

    #[test]
    fn test_custom_table() {
        let detector = EmergencyDetector::new(KeywordTable::new(vec!["snake bite".into()], vec![]));
        assert!(detector.classify("A SNAKE BITE on my leg"));
        assert!(!detector.classify("chest pain"));
    }

    proptest! {
        #[test]
        fn prop_any_phrase_in_any_case_is_detected(
            idx in 0..DEFAULT_EMERGENCY_PHRASES.len(),
            prefix in "[a-z ]{0,20}",
            suffix in "[a-z ]{0,20}",
            upper in any::<bool>(),
        ) {
            let phrase = DEFAULT_EMERGENCY_PHRASES[idx];
            let phrase = if upper { phrase.to_uppercase() } else { phrase.to_string() };
            let text = format!("{prefix}{phrase}{suffix}");
            prop_assert!(EmergencyDetector::default().classify(&text));
        }

        #[test]
        fn prop_no_phrase_means_not_emergency(text in "[a-zA-Z ,.]{0,80}") {
            let lowered = text.to_lowercase();
            let expected = DEFAULT_EMERGENCY_PHRASES.iter().any(|p| lowered.contains(p));
            prop_assert_eq!(EmergencyDetector::default().classify(&text), expected);
        }
    }
}
