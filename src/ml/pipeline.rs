// ============================================================
// Layer 5 — Pipeline Variants
// ============================================================
// The closed set of things that can answer a prediction
// request:
//
//   TrainedPipeline        — fitted TextFeaturizer + SpamClassifier,
//                            the unit that gets persisted
//   FallbackAllHamPipeline — answers ham / 0.0 for everything,
//                            used when no model can be loaded
//                            or trained
//
// Pipeline wraps both so callers hold one value and never
// care which variant they got, except through `source()`.

use serde::{Deserialize, Serialize};

use crate::domain::error::{ClassifierError, Result};
use crate::domain::prediction::{PredictionSource, Predictions};
use crate::domain::traits::Scorer;
use crate::ml::classifier::{label_for, ClassifierConfig, FitReport, SpamClassifier};
use crate::ml::evaluation::EvaluationReport;
use crate::ml::featurizer::{FeaturizerConfig, TextFeaturizer};

/// Featurizer and classifier fitted together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedPipeline {
    featurizer: TextFeaturizer,
    classifier: SpamClassifier,
}

impl TrainedPipeline {
    /// Fit the featurizer on `texts`, then the classifier on the resulting features.
    pub fn fit(
        featurizer_config: FeaturizerConfig,
        classifier_config: ClassifierConfig,
        texts:             &[String],
        labels:            &[u8],
    ) -> Result<(Self, FitReport)> {
        if texts.len() != labels.len() {
            return Err(ClassifierError::InvalidInput(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }

        let mut featurizer = TextFeaturizer::new(featurizer_config);
        let x = featurizer.fit_transform(texts)?;
        tracing::info!(
            "Vocabulary: {} terms, {} non-zero features over {} messages",
            x.n_cols(),
            x.nnz(),
            x.n_rows()
        );

        let mut classifier = SpamClassifier::new(classifier_config);
        let report = classifier.fit(&x, labels)?;

        Ok((Self { featurizer, classifier }, report))
    }

    pub fn featurizer(&self) -> &TextFeaturizer {
        &self.featurizer
    }

    pub fn classifier(&self) -> &SpamClassifier {
        &self.classifier
    }

    /// Featurizer and classifier are both fitted and agree on the feature count.
    pub fn check_consistency(&self) -> Result<()> {
        self.featurizer.check_state()?;
        let n_terms = self.featurizer.vocabulary().map_or(0, |v| v.len());
        let coef = self
            .classifier
            .coefficients()
            .ok_or(ClassifierError::NotFitted("SpamClassifier"))?;
        if coef.len() != n_terms {
            return Err(ClassifierError::InvalidInput(format!(
                "classifier has {} coefficients, vocabulary has {} terms",
                coef.len(),
                n_terms
            )));
        }
        let intercept = self.classifier.intercept().unwrap_or(0.0);
        if !intercept.is_finite() || coef.iter().any(|w| !w.is_finite()) {
            return Err(ClassifierError::InvalidInput("non-finite classifier weight".into()));
        }
        Ok(())
    }

    pub fn predict(&self, texts: &[String]) -> Result<Vec<u8>> {
        self.classifier.predict(&self.featurizer.transform(texts)?)
    }

    pub fn predict_proba(&self, texts: &[String]) -> Result<Vec<f64>> {
        self.classifier.predict_proba(&self.featurizer.transform(texts)?)
    }

    pub fn evaluate(&self, texts: &[String], labels: &[u8]) -> Result<EvaluationReport> {
        self.classifier.evaluate(&self.featurizer.transform(texts)?, labels)
    }
}

impl Scorer for TrainedPipeline {
    fn score(&self, texts: &[String]) -> Result<Predictions> {
        // one transform, labels derived from the same probabilities
        let probabilities = self.predict_proba(texts)?;
        let labels = probabilities.iter().copied().map(label_for).collect();
        Ok(Predictions::new(labels, probabilities, PredictionSource::Trained))
    }
}

/// Degenerate pipeline that labels every message ham with probability 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FallbackAllHamPipeline;

impl Scorer for FallbackAllHamPipeline {
    fn score(&self, texts: &[String]) -> Result<Predictions> {
        Ok(Predictions::all_ham(texts.len()))
    }
}

/// Whichever variant the load step produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Pipeline {
    Trained(TrainedPipeline),
    Fallback(FallbackAllHamPipeline),
}

impl Pipeline {
    pub fn source(&self) -> PredictionSource {
        match self {
            Pipeline::Trained(_)  => PredictionSource::Trained,
            Pipeline::Fallback(_) => PredictionSource::Fallback,
        }
    }
}

impl Scorer for Pipeline {
    fn score(&self, texts: &[String]) -> Result<Predictions> {
        match self {
            Pipeline::Trained(p)  => p.score(texts),
            Pipeline::Fallback(p) => p.score(texts),
        }
    }
}
