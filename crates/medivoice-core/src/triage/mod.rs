//! Keyword triage: emergency detection and symptom extraction.
//!
//! Both classifiers are plain lower-cased substring matchers over an
//! immutable [`KeywordTable`]. There is no tokenisation, stemming or
//! negation handling, so "no chest pain" still matches "chest pain".

mod emergency;
mod keywords;
mod symptoms;

pub use emergency::EmergencyDetector;
pub use keywords::{KeywordTable, DEFAULT_EMERGENCY_PHRASES, DEFAULT_SYMPTOM_VOCABULARY};
pub use symptoms::SymptomExtractor;
