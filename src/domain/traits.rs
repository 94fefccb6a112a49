// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams the rest of the system programs against:
//
//   RecordSource — anything that yields raw labelled messages
//                  (CsvLoader today, an in-memory corpus in tests)
//   Scorer       — anything that turns texts into predictions
//                  (TrainedPipeline, FallbackAllHamPipeline)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::error::Result;
use crate::domain::prediction::Predictions;
use crate::domain::record::RawRecord;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can load labelled messages.
pub trait RecordSource {
    /// Load every record, in file order.
    fn load_raw(&self) -> Result<Vec<RawRecord>>;
}

/// A fixed in-memory corpus is a valid source too.
impl RecordSource for Vec<RawRecord> {
    fn load_raw(&self) -> Result<Vec<RawRecord>> {
        Ok(self.clone())
    }
}

// ─── Scorer ───────────────────────────────────────────────────────────────────
/// Any component that can label texts as spam or ham.
pub trait Scorer {
    /// Returns one label and one spam probability per input text.
    fn score(&self, texts: &[String]) -> Result<Predictions>;
}
