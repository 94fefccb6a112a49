// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the CSV file on disk and the lists of
// texts/labels the featurizer consumes.
//
// The pipeline flows in this order:
//
//   sms_spam_no_header.csv
//       │
//       ▼
//   CsvLoader         → reads (label, text) rows
//       │
//       ▼
//   Preprocessor      → binarises labels, lowercases + trims text
//       │
//       ▼
//   stratified_split  → test set, then validation set
//       │
//       ▼
//   DatasetSplit      → train / val / test PreparedRecords
//
// batch.rs handles the other CSV shape the system sees:
// user-uploaded files of messages to classify.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Loads the headerless labelled corpus with the csv crate
pub mod loader;

/// Binarises labels and cleans message text
pub mod preprocessor;

/// Seeded, stratified two-way splitting
pub mod splitter;

/// SpamDataset: load + preprocess + three-way split
pub mod dataset;

/// Headered CSV input/output for batch prediction
pub mod batch;
