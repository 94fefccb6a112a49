// ============================================================
// Layer 4 — Record Preprocessor
// ============================================================
// Turns raw CSV rows into records the featurizer can consume.
//
// Cleaning steps (applied per record):
//   1. Label: exact match on "spam" → 1, anything else → 0
//   2. Text: lowercase
//   3. Text: trim leading/trailing whitespace
//
// Labels that are neither "spam" nor "ham" (typos, stray
// header rows) fall through to ham. They are counted and
// logged so a dirty corpus is visible in the training output.
//
// Pure: no I/O, and idempotent — a prepared record fed back
// through prepare() comes out unchanged.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

use crate::domain::record::{PreparedRecord, RawRecord, HAM_LABEL, SPAM_LABEL};

pub struct Preprocessor;

impl Preprocessor {
    /// Create a new Preprocessor instance
    pub fn new() -> Self {
        Self
    }

    /// Binarise a label string. Only the exact string "spam" is spam.
    pub fn binarize(&self, label: &str) -> u8 {
        u8::from(label == SPAM_LABEL)
    }

    /// Lowercase and trim one message.
    pub fn clean(&self, text: &str) -> String {
        text.to_lowercase().trim().to_string()
    }

    /// Prepare a single raw record.
    pub fn prepare(&self, record: &RawRecord) -> PreparedRecord {
        PreparedRecord {
            label: self.binarize(&record.label),
            text:  self.clean(&record.text),
        }
    }

    /// Prepare every record, preserving order.
    pub fn preprocess(&self, records: &[RawRecord]) -> Vec<PreparedRecord> {
        let unknown = records
            .iter()
            .filter(|r| r.label != SPAM_LABEL && r.label != HAM_LABEL)
            .count();
        if unknown > 0 {
            tracing::warn!(
                "{} records have a label other than '{}'/'{}' and are treated as ham",
                unknown,
                SPAM_LABEL,
                HAM_LABEL
            );
        }

        records.iter().map(|r| self.prepare(r)).collect()
    }
}

/// Implement Default so Preprocessor can be created with Preprocessor::default()
impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
