// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (training a model or scoring messages).
//
// Rules for this layer:
//   - No ML math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - File access only through Layer 4 and Layer 6 types
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// Load-or-train prediction with the all-ham fallback boundary
pub mod scoring_pipeline;
