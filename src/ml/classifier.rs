// ============================================================
// Layer 5 — Logistic Regression Classifier
// ============================================================
// Binary spam/ham classifier trained on sparse TF-IDF rows.
//
// Objective (θ = weights w plus unregularised bias b):
//
//   f(θ) = 1/W · Σ sᵢ · log(1 + exp(-tᵢ·zᵢ))  +  ‖w‖² / (2·C·W)
//
//   zᵢ = w·xᵢ + b,  tᵢ = ±1,  sᵢ = class weight of sample i,
//   W  = Σ sᵢ.  Dividing by W keeps step sizes independent
//   of corpus size; the minimiser is the usual C-weighted one.
//
// Class balancing:
//   "balanced" weights each class by n / (2 · n_class), so the
//   ~13% spam minority counts as much as the ham majority.
//
// Optimiser: Newton-CG
//   1. gradient g = 1/W · Σ sᵢ(pᵢ - yᵢ)·xᵢ + w/(C·W)
//   2. solve H·d = -g with conjugate gradient, using
//      Hessian-vector products (never the full Hessian)
//   3. backtracking line search on f along d
//   Stops when ‖g‖ ≤ tol · max(1, ‖g₀‖). Running out of
//   iterations first is reported as a warning, not an error:
//   the weights found so far are kept and usable.
//
// Reference: Nocedal & Wright (2006) Numerical Optimization, §7.1
//            Lin, Weng & Keerthi (2008) Trust region Newton
//            method for logistic regression

use serde::{Deserialize, Serialize};

use crate::domain::error::{ClassifierError, Result};
use crate::ml::evaluation::EvaluationReport;
use crate::ml::sparse::{sparse_dot, SparseMatrix};

/// Probability at or above which a message is labelled spam.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Armijo sufficient-decrease constant for the line search.
const ARMIJO_C: f64 = 1e-4;

/// Hard cap on conjugate-gradient steps per Newton iteration.
const MAX_CG_ITER: usize = 250;

/// How the loss is weighted across the two classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassBalance {
    /// Reweight inversely to class frequency
    Balanced,
    /// Every sample counts once
    None,
}

/// Classifier hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Inverse regularisation strength; larger means weaker L2 penalty
    pub c:             f64,
    pub class_balance: ClassBalance,
    /// Recorded with the model; the Newton-CG solver itself is deterministic
    pub random_seed:   u64,
    /// Newton iteration budget
    pub max_iter:      usize,
    /// Relative gradient-norm tolerance
    pub tol:           f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            c:             1.0,
            class_balance: ClassBalance::Balanced,
            random_seed:   42,
            max_iter:      100,
            tol:           1e-4,
        }
    }
}

impl ClassifierConfig {
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_class_balance(mut self, class_balance: ClassBalance) -> Self {
        self.class_balance = class_balance;
        self
    }
}

/// Learned parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LinearModel {
    coef:          Vec<f64>,
    intercept:     f64,
    /// `[ham weight, spam weight]` used during fit
    class_weights: [f64; 2],
}

/// Outcome of a call to `fit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    pub iterations: usize,
    pub converged:  bool,
    pub objective:  f64,
}

/// L2-regularised logistic regression over sparse features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpamClassifier {
    config: ClassifierConfig,
    model:  Option<LinearModel>,
}

impl SpamClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config, model: None }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.model.as_ref().map(|m| m.coef.as_slice())
    }

    pub fn intercept(&self) -> Option<f64> {
        self.model.as_ref().map(|m| m.intercept)
    }

    pub fn class_weights(&self) -> Option<[f64; 2]> {
        self.model.as_ref().map(|m| m.class_weights)
    }

    /// Train on rows of `x` with labels `y` (0 = ham, 1 = spam).
    pub fn fit(&mut self, x: &SparseMatrix, y: &[u8]) -> Result<FitReport> {
        validate_training_data(x, y, self.config.c)?;

        let class_weights = self.class_weights_for(y);
        let sample_w: Vec<f64> = y.iter().map(|&l| class_weights[usize::from(l)]).collect();
        let problem = Problem {
            x,
            y,
            sample_w:  &sample_w,
            total_w:   sample_w.iter().sum(),
            c:         self.config.c,
        };

        let n_params = x.n_cols() + 1;
        let mut theta = vec![0.0; n_params];

        let mut z         = problem.margins(&theta);
        let mut objective = problem.objective(&theta, &z);
        let mut grad      = problem.gradient(&theta, &z);
        let g0_norm       = norm(&grad).max(1.0);
        let mut converged = false;
        let mut iterations = 0;

        for iter in 0..self.config.max_iter {
            if norm(&grad) <= self.config.tol * g0_norm {
                converged = true;
                break;
            }
            iterations = iter + 1;

            let d_i       = problem.curvature(&z);
            let direction = conjugate_gradient(
                |v| problem.hessian_vec(&d_i, v),
                &grad,
                0.1 * norm(&grad),
                MAX_CG_ITER.min(n_params),
            );

            // Backtracking line search along the Newton direction
            let slope    = dot(&grad, &direction);
            let mut step = 1.0;
            let mut accepted = false;
            while step > 1e-10 {
                let trial: Vec<f64> = theta
                    .iter()
                    .zip(&direction)
                    .map(|(t, d)| t + step * d)
                    .collect();
                let trial_z   = problem.margins(&trial);
                let trial_obj = problem.objective(&trial, &trial_z);
                if trial_obj <= objective + ARMIJO_C * step * slope {
                    theta     = trial;
                    z         = trial_z;
                    objective = trial_obj;
                    accepted  = true;
                    break;
                }
                step *= 0.5;
            }

            grad = problem.gradient(&theta, &z);
            tracing::debug!(
                "newton iter {}: objective={:.6} |g|={:.3e} step={}",
                iterations,
                objective,
                norm(&grad),
                step
            );

            if !accepted {
                // no descent possible along d: we are at numerical precision
                converged = norm(&grad) <= self.config.tol * g0_norm;
                break;
            }
        }

        if !converged && norm(&grad) <= self.config.tol * g0_norm {
            converged = true;
        }

        if converged {
            tracing::info!("Classifier converged after {} iterations", iterations);
        } else {
            tracing::warn!(
                "Classifier did not converge within {} iterations (|g|={:.3e}); keeping current weights",
                self.config.max_iter,
                norm(&grad)
            );
        }

        let intercept = theta.pop().unwrap_or(0.0);
        self.model = Some(LinearModel { coef: theta, intercept, class_weights });

        Ok(FitReport { iterations, converged, objective })
    }

    /// Spam probability for every row.
    pub fn predict_proba(&self, x: &SparseMatrix) -> Result<Vec<f64>> {
        let model = self.fitted_model(x)?;
        Ok(x.rows()
            .map(|row| sigmoid(sparse_dot(row, &model.coef) + model.intercept))
            .collect())
    }

    /// 0/1 label for every row, thresholding the spam probability at 0.5.
    pub fn predict(&self, x: &SparseMatrix) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(label_for)
            .collect())
    }

    /// Accuracy, precision, recall, F1, ROC-AUC and the confusion matrix.
    pub fn evaluate(&self, x: &SparseMatrix, y_true: &[u8]) -> Result<EvaluationReport> {
        let proba  = self.predict_proba(x)?;
        let y_pred: Vec<u8> = proba.iter().copied().map(label_for).collect();
        EvaluationReport::compute(y_true, &y_pred, &proba)
    }

    fn fitted_model(&self, x: &SparseMatrix) -> Result<&LinearModel> {
        let model = self
            .model
            .as_ref()
            .ok_or(ClassifierError::NotFitted("SpamClassifier"))?;
        if x.n_cols() != model.coef.len() {
            return Err(ClassifierError::InvalidInput(format!(
                "feature matrix has {} columns, model expects {}",
                x.n_cols(),
                model.coef.len()
            )));
        }
        Ok(model)
    }

    fn class_weights_for(&self, y: &[u8]) -> [f64; 2] {
        match self.config.class_balance {
            ClassBalance::None => [1.0, 1.0],
            ClassBalance::Balanced => {
                let n    = y.len() as f64;
                let spam = y.iter().filter(|&&l| l == 1).count() as f64;
                let ham  = n - spam;
                [n / (2.0 * ham), n / (2.0 * spam)]
            }
        }
    }
}

/// Label for a spam probability.
pub fn label_for(p: f64) -> u8 {
    u8::from(p >= DECISION_THRESHOLD)
}

fn validate_training_data(x: &SparseMatrix, y: &[u8], c: f64) -> Result<()> {
    if x.n_rows() != y.len() {
        return Err(ClassifierError::InvalidInput(format!(
            "{} feature rows but {} labels",
            x.n_rows(),
            y.len()
        )));
    }
    if y.is_empty() {
        return Err(ClassifierError::InvalidInput("cannot fit on zero samples".into()));
    }
    if let Some(bad) = y.iter().find(|&&l| l > 1) {
        return Err(ClassifierError::InvalidInput(format!("label {bad} is not 0 or 1")));
    }
    if y.iter().all(|&l| l == y[0]) {
        return Err(ClassifierError::InvalidInput(
            "training labels contain a single class; need both spam and ham".into(),
        ));
    }
    if !(c > 0.0) {
        return Err(ClassifierError::InvalidInput(format!("C must be positive, got {c}")));
    }
    Ok(())
}

// ─── Optimisation problem ─────────────────────────────────────────────────────
// θ layout: [w₀ .. w_{d-1}, b]
struct Problem<'a> {
    x:        &'a SparseMatrix,
    y:        &'a [u8],
    sample_w: &'a [f64],
    total_w:  f64,
    c:        f64,
}

impl Problem<'_> {
    fn bias(theta: &[f64]) -> f64 {
        theta[theta.len() - 1]
    }

    fn margins(&self, theta: &[f64]) -> Vec<f64> {
        let b = Self::bias(theta);
        self.x.rows().map(|row| sparse_dot(row, theta) + b).collect()
    }

    fn objective(&self, theta: &[f64], z: &[f64]) -> f64 {
        let loss: f64 = z
            .iter()
            .zip(self.y)
            .zip(self.sample_w)
            .map(|((&zi, &yi), &si)| {
                let t = if yi == 1 { 1.0 } else { -1.0 };
                si * softplus(-t * zi)
            })
            .sum();
        let w = &theta[..theta.len() - 1];
        loss / self.total_w + dot(w, w) / (2.0 * self.c * self.total_w)
    }

    fn gradient(&self, theta: &[f64], z: &[f64]) -> Vec<f64> {
        let d = theta.len() - 1;
        let mut g = vec![0.0; theta.len()];
        for (i, row) in self.x.rows().enumerate() {
            let r = self.sample_w[i] * (sigmoid(z[i]) - f64::from(self.y[i])) / self.total_w;
            for &(col, v) in row {
                g[col] += r * v;
            }
            g[d] += r;
        }
        let reg = 1.0 / (self.c * self.total_w);
        for j in 0..d {
            g[j] += reg * theta[j];
        }
        g
    }

    /// Per-sample second-derivative weights sᵢ·pᵢ(1-pᵢ)/W.
    fn curvature(&self, z: &[f64]) -> Vec<f64> {
        z.iter()
            .zip(self.sample_w)
            .map(|(&zi, &si)| {
                let p = sigmoid(zi);
                si * p * (1.0 - p) / self.total_w
            })
            .collect()
    }

    fn hessian_vec(&self, d_i: &[f64], v: &[f64]) -> Vec<f64> {
        let d = v.len() - 1;
        let mut hv = vec![0.0; v.len()];
        for (i, row) in self.x.rows().enumerate() {
            let xv = (sparse_dot(row, v) + v[d]) * d_i[i];
            for &(col, val) in row {
                hv[col] += xv * val;
            }
            hv[d] += xv;
        }
        let reg = 1.0 / (self.c * self.total_w);
        for j in 0..d {
            hv[j] += reg * v[j];
        }
        hv
    }
}

/// Approximately solve H·d = -g.
fn conjugate_gradient<F>(hv: F, g: &[f64], tol: f64, max_iter: usize) -> Vec<f64>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let mut d: Vec<f64> = vec![0.0; g.len()];
    let mut r: Vec<f64> = g.iter().map(|x| -x).collect();
    let mut p  = r.clone();
    let mut rr = dot(&r, &r);

    for _ in 0..max_iter {
        if rr.sqrt() <= tol {
            break;
        }
        let hp  = hv(&p);
        let php = dot(&p, &hp);
        if php <= 0.0 {
            break;
        }
        let alpha = rr / php;
        for j in 0..d.len() {
            d[j] += alpha * p[j];
            r[j] -= alpha * hp[j];
        }
        let rr_new = dot(&r, &r);
        let beta   = rr_new / rr;
        for j in 0..p.len() {
            p[j] = r[j] + beta * p[j];
        }
        rr = rr_new;
    }

    // CG made no progress (e.g. flat curvature): fall back to steepest descent
    if d.iter().all(|&x| x == 0.0) {
        return g.iter().map(|x| -x).collect();
    }
    d
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// log(1 + eˣ) without overflow.
fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::featurizer::{FeaturizerConfig, TextFeaturizer};

    /// Two well separated clusters on columns 0 and 1.
    fn separable() -> (SparseMatrix, Vec<u8>) {
        let rows = vec![
            vec![(0, 1.0)],
            vec![(0, 0.9), (1, 0.1)],
            vec![(0, 0.8)],
            vec![(1, 1.0)],
            vec![(0, 0.1), (1, 0.9)],
            vec![(1, 0.8)],
        ];
        (SparseMatrix::new(2, rows), vec![0, 0, 0, 1, 1, 1])
    }

    #[test]
    fn test_sigmoid_and_softplus_are_stable() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(-800.0) >= 0.0 && sigmoid(800.0) <= 1.0);
        assert!(softplus(800.0).is_finite());
        assert!((softplus(0.0) - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_fit_separable_converges() {
        let (x, y) = separable();
        let mut clf = SpamClassifier::new(ClassifierConfig::default().with_c(10.0));
        let report  = clf.fit(&x, &y).unwrap();
        assert!(report.converged);
        assert_eq!(clf.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_evaluate_separable_is_perfect() {
        let (x, y) = separable();
        let mut clf = SpamClassifier::new(ClassifierConfig::default().with_c(10.0));
        clf.fit(&x, &y).unwrap();
        let report = clf.evaluate(&x, &y).unwrap();
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.confusion_matrix[0][1], 0);
        assert_eq!(report.confusion_matrix[1][0], 0);
        assert_eq!(report.roc_auc, 1.0);
    }

    #[test]
    fn test_probabilities_in_unit_interval() {
        let (x, y) = separable();
        let mut clf = SpamClassifier::new(ClassifierConfig::default());
        clf.fit(&x, &y).unwrap();
        for p in clf.predict_proba(&x).unwrap() {
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_stronger_regularisation_shrinks_weights() {
        let (x, y) = separable();
        let mut weak   = SpamClassifier::new(ClassifierConfig::default().with_c(100.0));
        let mut strong = SpamClassifier::new(ClassifierConfig::default().with_c(0.01));
        weak.fit(&x, &y).unwrap();
        strong.fit(&x, &y).unwrap();
        let l2 = |c: &SpamClassifier| norm(c.coefficients().unwrap());
        assert!(l2(&strong) < l2(&weak));
    }

    #[test]
    fn test_balanced_class_weights() {
        let x = SparseMatrix::new(1, vec![vec![(0, 1.0)]; 4]);
        let y = vec![0, 0, 0, 1];
        let mut clf = SpamClassifier::new(ClassifierConfig::default());
        clf.fit(&x, &y).unwrap();
        // n / (2 * n_class): 4/6 for ham, 4/2 for spam
        let [ham, spam] = clf.class_weights().unwrap();
        assert!((ham - 4.0 / 6.0).abs() < 1e-12);
        assert!((spam - 2.0).abs() < 1e-12);

        let mut plain = SpamClassifier::new(
            ClassifierConfig::default().with_class_balance(ClassBalance::None),
        );
        plain.fit(&x, &y).unwrap();
        assert_eq!(plain.class_weights().unwrap(), [1.0, 1.0]);
    }

    #[test]
    fn test_balanced_weights_raise_minority_probability() {
        // identical rows: the model can only learn the (weighted) base rate
        let x = SparseMatrix::new(1, vec![vec![(0, 1.0)]; 4]);
        let y = vec![0, 0, 0, 1];
        let mut balanced = SpamClassifier::new(ClassifierConfig::default());
        let mut plain    = SpamClassifier::new(
            ClassifierConfig::default().with_class_balance(ClassBalance::None),
        );
        balanced.fit(&x, &y).unwrap();
        plain.fit(&x, &y).unwrap();
        let pb = balanced.predict_proba(&x).unwrap()[0];
        let pp = plain.predict_proba(&x).unwrap()[0];
        assert!(pb > pp);
    }

    #[test]
    fn test_non_convergence_is_not_fatal() {
        let (x, y) = separable();
        let cfg = ClassifierConfig { max_iter: 1, tol: 1e-12, ..ClassifierConfig::default() };
        let mut clf = SpamClassifier::new(cfg);
        let report  = clf.fit(&x, &y).unwrap();
        assert!(!report.converged);
        assert!(clf.is_fitted());
        assert_eq!(clf.predict(&x).unwrap().len(), 6);
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = separable();
        let clf = SpamClassifier::new(ClassifierConfig::default());
        assert_eq!(clf.predict(&x).unwrap_err().kind(), "NotFittedError");
        assert_eq!(clf.predict_proba(&x).unwrap_err().kind(), "NotFittedError");
    }

    #[test]
    fn test_rejects_bad_training_data() {
        let (x, _) = separable();
        let mut clf = SpamClassifier::new(ClassifierConfig::default());
        assert_eq!(clf.fit(&x, &[0, 1]).unwrap_err().kind(), "InvalidInput");
        assert_eq!(clf.fit(&x, &[0, 0, 0, 0, 0, 0]).unwrap_err().kind(), "InvalidInput");
        assert_eq!(clf.fit(&x, &[0, 1, 2, 0, 1, 0]).unwrap_err().kind(), "InvalidInput");
    }

    #[test]
    fn test_column_mismatch_rejected() {
        let (x, y) = separable();
        let mut clf = SpamClassifier::new(ClassifierConfig::default());
        clf.fit(&x, &y).unwrap();
        let wider = SparseMatrix::new(3, vec![vec![(2, 1.0)]]);
        assert_eq!(clf.predict(&wider).unwrap_err().kind(), "InvalidInput");
    }

    #[test]
    fn test_empty_batch_predicts_nothing() {
        let (x, y) = separable();
        let mut clf = SpamClassifier::new(ClassifierConfig::default());
        clf.fit(&x, &y).unwrap();
        let empty = SparseMatrix::new(2, Vec::new());
        assert!(clf.predict(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_four_message_scenario() {
        let texts = ["hello how are you", "win free money now", "meeting at 3pm", "claim your prize!!!"];
        let y     = vec![0, 1, 0, 1];
        let mut f = TextFeaturizer::new(FeaturizerConfig::default().with_max_features(100));
        let x     = f.fit_transform(&texts).unwrap();

        let mut clf = SpamClassifier::new(ClassifierConfig::default());
        clf.fit(&x, &y).unwrap();
        assert_eq!(clf.predict(&x).unwrap().len(), 4);

        let report = clf.evaluate(&x, &y).unwrap();
        assert!((0.0..=1.0).contains(&report.accuracy));
        assert_eq!(report.confusion_matrix.len(), 2);
    }
}
