// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training run in order:
//
//   Step 1: Load the CSV corpus          (Layer 4 - data)
//   Step 2: Binarize + clean             (Layer 4 - data)
//   Step 3: Stratified train/val/test    (Layer 4 - data)
//   Step 4: Fit featurizer on train      (Layer 5 - ml)
//   Step 5: Fit classifier on train      (Layer 5 - ml)
//   Step 6: Evaluate every split         (Layer 5 - ml)
//   Step 7: Save artifact + config       (Layer 6 - infra)
//   Step 8: Write metrics JSON           (Layer 6 - infra)
//
// Only the training split ever reaches fit(); validation and
// test text is seen by the featurizer through transform() only.
//
// Reference: Rust Book §13 (Iterators and Closures)

use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::{DatasetSplit, SpamDataset, SplitConfig},
    loader::CsvLoader,
};
use crate::domain::error::{ClassifierError, Result};
use crate::domain::record::{texts_and_labels, PreparedRecord};
use crate::infra::{
    artifact_store::ArtifactStore,
    metrics::{MetricsStore, SplitMetrics},
};
use crate::ml::{
    classifier::{ClassBalance, ClassifierConfig, FitReport},
    evaluation::EvaluationReport,
    featurizer::FeaturizerConfig,
    pipeline::TrainedPipeline,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Every tunable of a run, plus where to read data and write results.
// Serialisable so the run that produced an artifact can be traced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:      String,
    pub model_dir:      String,
    pub results_dir:    String,
    pub test_size:      f64,
    pub val_size:       f64,
    pub seed:           u64,
    pub max_features:   usize,
    pub max_ngram:      usize,
    pub min_df:         usize,
    pub max_df:         f64,
    pub regularization: f64,
    pub class_balance:  ClassBalance,
    pub max_iter:       usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:      "data/raw/sms_spam_no_header.csv".to_string(),
            model_dir:      "models/phase1".to_string(),
            results_dir:    "results/phase1".to_string(),
            test_size:      0.15,
            val_size:       0.15,
            seed:           42,
            max_features:   10_000,
            max_ngram:      2,
            min_df:         1,
            max_df:         0.95,
            regularization: 1.0,
            class_balance:  ClassBalance::Balanced,
            max_iter:       100,
        }
    }
}

impl TrainConfig {
    pub fn split_config(&self) -> SplitConfig {
        SplitConfig {
            test_fraction: self.test_size,
            val_fraction:  self.val_size,
            seed:          self.seed,
        }
    }

    pub fn featurizer_config(&self) -> FeaturizerConfig {
        FeaturizerConfig {
            max_features: self.max_features,
            ngram_range:  (1, self.max_ngram),
            min_df:       self.min_df,
            max_df:       self.max_df,
        }
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            c:             self.regularization,
            class_balance: self.class_balance,
            random_seed:   self.seed,
            max_iter:      self.max_iter,
            ..ClassifierConfig::default()
        }
    }

    pub fn artifact_store(&self) -> ArtifactStore {
        ArtifactStore::new(&self.model_dir)
    }

    pub fn metrics_store(&self) -> MetricsStore {
        MetricsStore::new(&self.results_dir)
    }
}

// ─── Run Results ──────────────────────────────────────────────────────────────
/// A pipeline fitted in memory, together with the split it was fitted on.
pub struct FittedRun {
    pub pipeline: TrainedPipeline,
    pub report:   FitReport,
    pub split:    DatasetSplit,
}

/// What a completed, persisted training run produced.
pub struct TrainOutcome {
    pub pipeline: TrainedPipeline,
    pub report:   FitReport,
    pub metrics:  SplitMetrics,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Steps 1–5: load, split and fit, without touching the model directory.
    pub fn fit(&self) -> Result<FittedRun> {
        let cfg = &self.config;

        // ── Steps 1–3: load, clean, split ────────────────────────────────────
        tracing::info!("Loading corpus from '{}'", cfg.data_path);
        let dataset = SpamDataset::new(CsvLoader::new(&cfg.data_path));
        let split   = dataset.load_split(&cfg.split_config())?;

        // ── Steps 4–5: fit on the training split only ────────────────────────
        let (texts, labels) = texts_and_labels(&split.train);
        let (pipeline, report) = TrainedPipeline::fit(
            cfg.featurizer_config(),
            cfg.classifier_config(),
            &texts,
            &labels,
        )?;

        Ok(FittedRun { pipeline, report, split })
    }

    /// The whole run: fit, evaluate, persist.
    pub fn execute(&self) -> Result<TrainOutcome> {
        let FittedRun { pipeline, report, split } = self.fit()?;

        // ── Step 6: evaluate every split ─────────────────────────────────────
        let metrics = SplitMetrics {
            train: evaluate_split(&pipeline, "train", &split.train)?,
            val:   evaluate_split(&pipeline, "val", &split.val)?,
            test:  evaluate_split(&pipeline, "test", &split.test)?,
        };

        // ── Step 7: artifact first, then the config that describes it ────────
        let store = self.config.artifact_store();
        store.save(&pipeline)?;
        store.save_config(&self.config)?;

        // ── Step 8: metrics ──────────────────────────────────────────────────
        self.config.metrics_store().save(&metrics)?;

        Ok(TrainOutcome { pipeline, report, metrics })
    }
}

/// Undefined metrics (single-class or empty split) are logged and skipped.
fn evaluate_split(
    pipeline: &TrainedPipeline,
    name:     &str,
    records:  &[PreparedRecord],
) -> Result<Option<EvaluationReport>> {
    let (texts, labels) = texts_and_labels(records);
    match pipeline.evaluate(&texts, &labels) {
        Ok(report) => {
            tracing::info!(
                "{name}: accuracy={:.3} precision={:.3} recall={:.3} f1={:.3} roc_auc={:.3}",
                report.accuracy,
                report.precision,
                report.recall,
                report.f1,
                report.roc_auc
            );
            Ok(Some(report))
        }
        Err(ClassifierError::MetricUndefined(reason)) => {
            tracing::warn!("{name}: metrics undefined ({reason})");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
