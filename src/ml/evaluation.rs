// ============================================================
// Layer 5 — Evaluation Metrics
// ============================================================
// Binary classification metrics with spam (1) as the positive
// class.
//
// Confusion matrix layout (rows = true, columns = predicted):
//
//                 pred ham   pred spam
//   true ham    [[   TN   ,     FP    ],
//   true spam    [   FN   ,     TP    ]]
//
//   precision = TP / (TP + FP)     0 when nothing is predicted spam
//   recall    = TP / (TP + FN)     0 when there is no spam
//   f1        = 2·P·R / (P + R)    0 when P + R = 0
//   roc_auc   = Mann–Whitney U / (n_pos · n_neg), ties count ½
//
// ROC-AUC is undefined when y_true holds a single class.
//
// Reference: Fawcett (2006) An introduction to ROC analysis

use serde::{Deserialize, Serialize};

use crate::domain::error::{ClassifierError, Result};

/// Metrics for one labelled evaluation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy:         f64,
    pub precision:        f64,
    pub recall:           f64,
    pub f1:               f64,
    pub roc_auc:          f64,
    pub confusion_matrix: [[u64; 2]; 2],
}

impl EvaluationReport {
    /// Score hard predictions and spam probabilities against the truth.
    pub fn compute(y_true: &[u8], y_pred: &[u8], scores: &[f64]) -> Result<Self> {
        if y_true.len() != y_pred.len() || y_true.len() != scores.len() {
            return Err(ClassifierError::InvalidInput(format!(
                "length mismatch: {} labels, {} predictions, {} scores",
                y_true.len(),
                y_pred.len(),
                scores.len()
            )));
        }
        if y_true.is_empty() {
            return Err(ClassifierError::MetricUndefined(
                "cannot evaluate an empty set".into(),
            ));
        }

        let cm = confusion_matrix(y_true, y_pred);
        let [[tn, fp], [fn_, tp]] = cm;
        let total = (tn + fp + fn_ + tp) as f64;

        let precision = ratio(tp, tp + fp);
        let recall    = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Ok(Self {
            accuracy: (tp + tn) as f64 / total,
            precision,
            recall,
            f1,
            roc_auc: roc_auc(y_true, scores)?,
            confusion_matrix: cm,
        })
    }

    /// Every scalar metric by name, in display order.
    pub fn scalars(&self) -> [(&'static str, f64); 5] {
        [
            ("accuracy",  self.accuracy),
            ("precision", self.precision),
            ("recall",    self.recall),
            ("f1",        self.f1),
            ("roc_auc",   self.roc_auc),
        ]
    }
}

/// 2×2 counts, rows = true class, columns = predicted class.
pub fn confusion_matrix(y_true: &[u8], y_pred: &[u8]) -> [[u64; 2]; 2] {
    let mut cm = [[0u64; 2]; 2];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        cm[usize::from(t.min(1))][usize::from(p.min(1))] += 1;
    }
    cm
}

/// Area under the ROC curve via average ranks.
pub fn roc_auc(y_true: &[u8], scores: &[f64]) -> Result<f64> {
    let n_pos = y_true.iter().filter(|&&l| l == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(ClassifierError::MetricUndefined(
            "ROC-AUC needs both classes in y_true".into(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // 1-based ranks, tied scores share their average rank
    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = y_true
        .iter()
        .zip(&ranks)
        .filter(|&(&l, _)| l == 1)
        .map(|(_, &r)| r)
        .sum();
    let n_pos = n_pos as f64;
    let u = pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0;
    Ok(u / (n_pos * n_neg as f64))
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}
