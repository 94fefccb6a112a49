use serde::{Deserialize, Serialize};

/// Which pipeline variant produced a set of predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionSource {
    /// A fitted featurizer + classifier
    Trained,
    /// The degenerate all-ham pipeline
    Fallback,
}

/// Labels and spam probabilities for a batch of texts.
///
/// Invariant: `labels.len() == probabilities.len()`, one entry per input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    pub labels:        Vec<u8>,
    pub probabilities: Vec<f64>,
    pub source:        PredictionSource,
}

impl Predictions {
    pub fn new(labels: Vec<u8>, probabilities: Vec<f64>, source: PredictionSource) -> Self {
        debug_assert_eq!(labels.len(), probabilities.len());
        Self { labels, probabilities, source }
    }

    /// The safe default: every text is ham with probability 0.
    pub fn all_ham(n: usize) -> Self {
        Self::new(vec![0; n], vec![0.0; n], PredictionSource::Fallback)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.source == PredictionSource::Fallback
    }

    /// Drops the source tag, returning `(labels, probabilities)`.
    pub fn into_parts(self) -> (Vec<u8>, Vec<f64>) {
        (self.labels, self.probabilities)
    }
}
