// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem after training:
//
//   artifact_store.rs — Saving and loading the trained pipeline
//                       Uses bincode inside a versioned
//                       envelope, written through a temp file
//                       and renamed into place. Also saves and
//                       loads TrainConfig as JSON next to it.
//
//   metrics.rs        — Evaluation report persistence
//                       Writes train/val/test metrics to a JSON
//                       file the `metrics` command reads back.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

/// Trained pipeline persistence
pub mod artifact_store;

/// Per-split evaluation metrics as JSON
pub mod metrics;
