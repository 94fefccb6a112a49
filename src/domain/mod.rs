// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define the core
// concepts of the system: labelled messages, predictions,
// the error taxonomy and the trait seams.
//
// Rules for this layer:
//   - NO file I/O
//   - NO featurisation or optimisation code
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Every failure kind the classifier core can report
pub mod error;

// Raw and prepared message records
pub mod record;

// Prediction batches and their provenance
pub mod prediction;

// Core abstractions (traits) that other layers implement
pub mod traits;
