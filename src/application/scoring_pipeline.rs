// ============================================================
// Layer 2 — Scoring Pipeline
// ============================================================
// The single entry point for predictions:
//
//   1. Load the persisted pipeline       (Layer 6 - infra)
//   2. None on disk? Train and save one  (Layer 2 - TrainUseCase)
//   3. Clean the texts like the corpus   (Layer 4 - data)
//   4. Score them                        (Layer 5 - ml)
//
// State progression:
//   Untrained → Trained-In-Memory → Persisted
//
// Failure policy:
//   predict_texts() never fails. Any error on the way (corrupt
//   artifact, missing training data, featurizer or classifier
//   error) is logged at warn and answered by the all-ham
//   fallback. The returned Predictions carry the source, so the
//   caller can tell a real answer from the fallback one.
//
//   try_predict_texts() is the same path without that boundary,
//   for callers that want the error itself.

use crate::application::train_use_case::{TrainConfig, TrainUseCase};
use crate::data::preprocessor::Preprocessor;
use crate::domain::error::Result;
use crate::domain::prediction::Predictions;
use crate::domain::traits::Scorer;
use crate::infra::artifact_store::ArtifactStore;
use crate::ml::pipeline::{FallbackAllHamPipeline, Pipeline, TrainedPipeline};

pub struct ScoringPipeline {
    config: TrainConfig,
    store:  ArtifactStore,
}

impl ScoringPipeline {
    /// Storage locations come from `config.model_dir` and `config.data_path`.
    pub fn new(config: TrainConfig) -> Self {
        let store = config.artifact_store();
        Self { config, store }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// The persisted pipeline, `None` when nothing was saved yet.
    pub fn load(&self) -> Result<Option<TrainedPipeline>> {
        self.store.load()
    }

    /// Run a full training round and overwrite the artifact.
    pub fn train_and_save(&self) -> Result<TrainedPipeline> {
        tracing::info!("Training a new pipeline");
        let outcome = TrainUseCase::new(self.config.clone()).execute()?;
        Ok(outcome.pipeline)
    }

    /// Load the artifact, training one first if none exists.
    pub fn load_or_train(&self) -> Result<TrainedPipeline> {
        match self.load()? {
            Some(pipeline) => Ok(pipeline),
            None => {
                tracing::info!(
                    "No artifact at '{}'",
                    self.store.artifact_path().display()
                );
                self.train_and_save()
            }
        }
    }

    /// Pick the variant that will answer: trained when possible, fallback otherwise.
    pub fn resolve(&self) -> Pipeline {
        match self.load_or_train() {
            Ok(pipeline) => Pipeline::Trained(pipeline),
            Err(e) => {
                tracing::warn!("Using all-ham fallback pipeline: {e}");
                Pipeline::Fallback(FallbackAllHamPipeline)
            }
        }
    }

    /// Same as predict_texts, but errors are returned instead of absorbed.
    pub fn try_predict_texts(&self, texts: &[String]) -> Result<Predictions> {
        let pipeline = self.load_or_train()?;
        let prep     = Preprocessor::new();
        let cleaned: Vec<String> = texts.iter().map(|t| prep.clean(t)).collect();
        pipeline.score(&cleaned)
    }

    /// One label and one spam probability per text; never fails.
    pub fn predict_texts(&self, texts: &[String]) -> Predictions {
        match self.try_predict_texts(texts) {
            Ok(predictions) => predictions,
            Err(e) => {
                tracing::warn!(
                    "Prediction failed ({}), answering all-ham for {} texts: {e}",
                    e.kind(),
                    texts.len()
                );
                Predictions::all_ham(texts.len())
            }
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::tests::config_with_corpus;
    use crate::domain::prediction::PredictionSource;
    use std::fs;

    fn strings(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    /// Points every path into `root` without writing any data.
    fn empty_config(root: &std::path::Path) -> TrainConfig {
        TrainConfig {
            data_path:   root.join("missing.csv").display().to_string(),
            model_dir:   root.join("models").display().to_string(),
            results_dir: root.join("results").display().to_string(),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = ScoringPipeline::new(config_with_corpus(dir.path())).predict_texts(&[]);
        assert_eq!(out.into_parts(), (vec![], vec![]));
    }

    #[test]
    fn test_no_artifact_no_data_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let out = ScoringPipeline::new(empty_config(dir.path()))
            .predict_texts(&strings(&["free money now"]));
        assert!(out.is_fallback());
        assert_eq!(out.into_parts(), (vec![0], vec![0.0]));
    }

    #[test]
    fn test_try_predict_surfaces_the_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScoringPipeline::new(empty_config(dir.path()))
            .try_predict_texts(&strings(&["free money now"]))
            .unwrap_err();
        assert_eq!(err.kind(), "DataLoadError");
    }

    #[test]
    fn test_load_without_artifact_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ScoringPipeline::new(empty_config(dir.path())).load().unwrap().is_none());
    }

    #[test]
    fn test_predict_trains_and_persists_on_first_use() {
        let dir     = tempfile::tempdir().unwrap();
        let scoring = ScoringPipeline::new(config_with_corpus(dir.path()));
        assert!(scoring.load().unwrap().is_none());

        let texts = strings(&["claim your free prize now", "see you at lunch"]);
        let out   = scoring.predict_texts(&texts);
        assert_eq!(out.source, PredictionSource::Trained);
        assert_eq!(out.len(), 2);
        assert!(out.probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(scoring.load().unwrap().is_some());
    }

    #[test]
    fn test_round_trip_matches_in_memory_pipeline() {
        let dir     = tempfile::tempdir().unwrap();
        let cfg     = config_with_corpus(dir.path());
        let scoring = ScoringPipeline::new(cfg.clone());

        let in_memory = scoring.train_and_save().unwrap();
        let loaded    = scoring.load().unwrap().unwrap();

        let run   = TrainUseCase::new(cfg).fit().unwrap();
        let (texts, _) = crate::domain::record::texts_and_labels(&run.split.train);

        assert_eq!(loaded.predict(&texts).unwrap(), in_memory.predict(&texts).unwrap());
        assert_eq!(
            loaded.predict_proba(&texts).unwrap(),
            in_memory.predict_proba(&texts).unwrap()
        );
        assert_eq!(
            scoring.predict_texts(&texts).labels,
            in_memory.predict(&texts).unwrap()
        );
    }

    #[test]
    fn test_retraining_is_deterministic() {
        let dir     = tempfile::tempdir().unwrap();
        let scoring = ScoringPipeline::new(config_with_corpus(dir.path()));
        let first   = scoring.train_and_save().unwrap();
        let second  = scoring.train_and_save().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_is_cleaned_before_scoring() {
        let dir     = tempfile::tempdir().unwrap();
        let scoring = ScoringPipeline::new(config_with_corpus(dir.path()));
        let lower   = scoring.predict_texts(&strings(&["claim your free prize now"]));
        let shouted = scoring.predict_texts(&strings(&["  CLAIM YOUR FREE PRIZE NOW "]));
        assert_eq!(lower, shouted);
    }

    #[test]
    fn test_corrupt_artifact_falls_back() {
        let dir     = tempfile::tempdir().unwrap();
        let cfg     = config_with_corpus(dir.path());
        let scoring = ScoringPipeline::new(cfg.clone());
        let path    = cfg.artifact_store().artifact_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"\x00\x01garbage").unwrap();

        assert_eq!(scoring.load().unwrap_err().kind(), "ArtifactCorruptError");
        let out = scoring.predict_texts(&strings(&["win cash now", "hi"]));
        assert!(out.is_fallback());
        assert_eq!(out.into_parts(), (vec![0, 0], vec![0.0, 0.0]));
    }

    #[test]
    fn test_damaged_length_prefix_falls_back() {
        let dir     = tempfile::tempdir().unwrap();
        let cfg     = config_with_corpus(dir.path());
        let scoring = ScoringPipeline::new(cfg.clone());
        scoring.train_and_save().unwrap();

        // first vocabulary term's length prefix in the bincode envelope
        let path      = cfg.artifact_store().artifact_path();
        let mut bytes = fs::read(&path).unwrap();
        bytes[53..61].copy_from_slice(&u64::MAX.to_le_bytes());
        fs::write(&path, bytes).unwrap();

        let out = scoring.predict_texts(&strings(&["free money now"]));
        assert!(out.is_fallback());
        assert_eq!(out.into_parts(), (vec![0], vec![0.0]));
    }

    #[test]
    fn test_inconsistent_artifact_falls_back() {
        let dir     = tempfile::tempdir().unwrap();
        let cfg     = config_with_corpus(dir.path());
        let scoring = ScoringPipeline::new(cfg.clone());
        let trained = scoring.train_and_save().unwrap();

        let mut json = serde_json::to_value(&trained).unwrap();
        json["featurizer"]["state"]["idf"] = serde_json::json!([1.0]);
        let broken: TrainedPipeline = serde_json::from_value(json).unwrap();
        cfg.artifact_store().save(&broken).unwrap();

        let out = scoring.predict_texts(&strings(&["free prize now"]));
        assert!(out.is_fallback());
        assert_eq!(out.into_parts(), (vec![0], vec![0.0]));
    }

    #[test]
    fn test_resolve_picks_variant() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            ScoringPipeline::new(empty_config(dir.path())).resolve().source(),
            PredictionSource::Fallback
        );
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            ScoringPipeline::new(config_with_corpus(dir.path())).resolve().source(),
            PredictionSource::Trained
        );
    }
}
