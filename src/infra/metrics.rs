// ============================================================
// Layer 6 — Metrics Store
// ============================================================
// Records the evaluation of the last training run as JSON.
//
// One report per split, keyed by split name:
//
//   {
//     "train": { "accuracy": 0.99, ..., "confusion_matrix": [[..],[..]] },
//     "val":   { ... },
//     "test":  { ... }
//   }
//
// Output file: results/phase1/metrics.json
//
// Each training run replaces the file. A split whose metrics
// were undefined (e.g. a single-class validation set) is
// written as null rather than aborting the run.
//
// How to read the metrics:
//   - train far above val → overfitting, raise regularization
//   - recall low with high precision → threshold too strict
//     for the spam class
//
// Reference: serde_json crate documentation

use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::{ClassifierError, Result};
use crate::ml::evaluation::EvaluationReport;

/// File name of the metrics report inside the results directory.
pub const METRICS_FILE: &str = "metrics.json";

/// Evaluation of one trained pipeline on each split.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitMetrics {
    pub train: Option<EvaluationReport>,
    pub val:   Option<EvaluationReport>,
    pub test:  Option<EvaluationReport>,
}

impl SplitMetrics {
    /// Reports present, in train/val/test order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &EvaluationReport)> {
        [("train", &self.train), ("val", &self.val), ("test", &self.test)]
            .into_iter()
            .filter_map(|(name, r)| r.as_ref().map(|r| (name, r)))
    }

    /// Names of the splits whose metrics were undefined, in train/val/test order.
    pub fn undefined(&self) -> Vec<&'static str> {
        [("train", &self.train), ("val", &self.val), ("test", &self.test)]
            .into_iter()
            .filter(|(_, r)| r.is_none())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Writes and reads metrics.json in the results directory.
pub struct MetricsStore {
    path: PathBuf,
}

impl MetricsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { path: dir.into().join(METRICS_FILE) }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Replace the metrics report with `metrics`.
    pub fn save(&self, metrics: &SplitMetrics) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(metrics)
            .map_err(|e| ClassifierError::Io(std::io::Error::other(e.to_string())))?;
        fs::write(&self.path, json)?;

        tracing::info!("Wrote metrics to '{}'", self.path.display());
        Ok(())
    }

    /// `Ok(None)` when no training run has written metrics yet.
    pub fn load(&self) -> Result<Option<SplitMetrics>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        serde_json::from_str(&json).map(Some).map_err(|e| {
            ClassifierError::InvalidInput(format!(
                "malformed metrics file '{}': {e}",
                self.path.display()
            ))
        })
    }
}
