// ============================================================
// Layer 5 — ML Layer
// ============================================================
// All numerical code lives here. No other layer computes a
// feature weight or a gradient.
//
//   sparse.rs     — Row-compressed sparse matrix the featurizer
//                   emits and the classifier consumes
//
//   featurizer.rs — TF-IDF over word 1..n-grams
//                   Learns a vocabulary and smoothed IDF
//                   weights, emits L2-normalized rows
//
//   classifier.rs — L2-regularized logistic regression
//                   Newton-CG solver with optional balanced
//                   class weights
//
//   evaluation.rs — Accuracy, precision, recall, F1, ROC-AUC
//                   and the confusion matrix
//
//   pipeline.rs   — Featurizer + classifier as one persisted
//                   unit, and the all-ham fallback variant
//
// Reference: Manning et al. (2008) Introduction to Information
//            Retrieval, ch. 6 (tf-idf weighting)
//            Lin, Weng & Keerthi (2008) Trust region Newton
//            method for logistic regression

/// Sparse row storage
pub mod sparse;

/// TF-IDF text featurizer
pub mod featurizer;

/// Logistic regression spam classifier
pub mod classifier;

/// Classification metrics
pub mod evaluation;

/// Trained and fallback pipelines
pub mod pipeline;
