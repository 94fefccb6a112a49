use serde::{Deserialize, Serialize};

use crate::data::{preprocessor::Preprocessor, splitter::stratified_split};
use crate::domain::error::{ClassifierError, Result};
use crate::domain::record::{PreparedRecord, RawRecord};
use crate::domain::traits::RecordSource;

/// Split fractions and the seed that makes them reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    pub test_fraction: f64,
    pub val_fraction:  f64,
    pub seed:          u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { test_fraction: 0.15, val_fraction: 0.15, seed: 42 }
    }
}

impl SplitConfig {
    /// Both fractions must be positive and sum to less than one.
    pub fn validate(&self) -> Result<()> {
        let (t, v) = (self.test_fraction, self.val_fraction);
        if !(t > 0.0 && v > 0.0 && t + v < 1.0) {
            return Err(ClassifierError::InvalidSplitConfig(format!(
                "need 0 < test ({t}), 0 < val ({v}) and test + val < 1"
            )));
        }
        Ok(())
    }

    /// Validation share of what is left after the test set is carved out.
    pub fn val_ratio_of_remainder(&self) -> f64 {
        self.val_fraction / (1.0 - self.test_fraction)
    }
}

/// Three disjoint stratified partitions of the prepared corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSplit {
    pub train: Vec<PreparedRecord>,
    pub val:   Vec<PreparedRecord>,
    pub test:  Vec<PreparedRecord>,
}

impl DatasetSplit {
    pub fn total(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }
}

/// Loads, cleans and partitions the SMS corpus.
pub struct SpamDataset<S: RecordSource> {
    source:       S,
    preprocessor: Preprocessor,
}

impl<S: RecordSource> SpamDataset<S> {
    pub fn new(source: S) -> Self {
        Self { source, preprocessor: Preprocessor::new() }
    }

    pub fn load_raw(&self) -> Result<Vec<RawRecord>> {
        self.source.load_raw()
    }

    pub fn preprocess(&self, records: &[RawRecord]) -> Vec<PreparedRecord> {
        self.preprocessor.preprocess(records)
    }

    /// Test set from the whole corpus first, then validation from the rest.
    pub fn load_split(&self, config: &SplitConfig) -> Result<DatasetSplit> {
        config.validate()?;

        let prepared = self.preprocess(&self.load_raw()?);
        if prepared.is_empty() {
            return Err(ClassifierError::DataLoad("dataset contains no records".into()));
        }

        let spam = prepared.iter().filter(|r| r.is_spam()).count();
        tracing::info!(
            "Corpus: {} records ({} spam, {} ham)",
            prepared.len(),
            spam,
            prepared.len() - spam
        );

        let (train_val, test) =
            stratified_split(prepared, config.test_fraction, config.seed, |r| r.label);
        let (train, val) = stratified_split(
            train_val,
            config.val_ratio_of_remainder(),
            config.seed,
            |r| r.label,
        );

        tracing::info!(
            "Split: {} train, {} validation, {} test",
            train.len(),
            val.len(),
            test.len()
        );

        Ok(DatasetSplit { train, val, test })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(n: usize) -> Vec<RawRecord> {
        (0..n)
            .map(|i| {
                let label = if i % 7 == 0 { "spam" } else { "ham" };
                RawRecord::new(label, format!("Message Number {i}"))
            })
            .collect()
    }

    fn spam_share(records: &[PreparedRecord]) -> f64 {
        records.iter().filter(|r| r.is_spam()).count() as f64 / records.len() as f64
    }

    #[test]
    fn test_partitions_are_exhaustive() {
        let ds    = SpamDataset::new(corpus(200));
        let split = ds.load_split(&SplitConfig::default()).unwrap();
        assert_eq!(split.total(), 200);
        assert_eq!(split.test.len(), 30);
        assert_eq!(split.val.len(), 30);
        assert_eq!(split.train.len(), 140);
    }

    #[test]
    fn test_partitions_are_disjoint() {
        let ds    = SpamDataset::new(corpus(120));
        let split = ds.load_split(&SplitConfig::default()).unwrap();
        let mut texts: Vec<&str> = split
            .train
            .iter()
            .chain(&split.val)
            .chain(&split.test)
            .map(|r| r.text.as_str())
            .collect();
        texts.sort_unstable();
        texts.dedup();
        assert_eq!(texts.len(), 120);
    }

    #[test]
    fn test_class_ratio_within_one_sample() {
        let ds     = SpamDataset::new(corpus(300));
        let split  = ds.load_split(&SplitConfig::default()).unwrap();
        let full   = 43.0 / 300.0; // i % 7 == 0 for 0..300
        for part in [&split.train, &split.val, &split.test] {
            let tolerance = 1.0 / part.len() as f64;
            assert!((spam_share(part) - full).abs() <= tolerance);
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let ds = SpamDataset::new(corpus(100));
        let a  = ds.load_split(&SplitConfig::default()).unwrap();
        let b  = ds.load_split(&SplitConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_text_is_prepared() {
        let ds    = SpamDataset::new(corpus(50));
        let split = ds.load_split(&SplitConfig::default()).unwrap();
        assert!(split.train.iter().all(|r| r.text.starts_with("message number")));
    }

    #[test]
    fn test_invalid_fractions_rejected() {
        let ds = SpamDataset::new(corpus(50));
        for (t, v) in [(0.5, 0.5), (0.0, 0.2), (0.2, 0.0), (0.9, 0.2), (-0.1, 0.3)] {
            let cfg = SplitConfig { test_fraction: t, val_fraction: v, seed: 42 };
            let err = ds.load_split(&cfg).unwrap_err();
            assert_eq!(err.kind(), "InvalidSplitConfig");
        }
    }

    #[test]
    fn test_empty_corpus_is_data_load_error() {
        let ds  = SpamDataset::new(Vec::<RawRecord>::new());
        let err = ds.load_split(&SplitConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "DataLoadError");
    }
}
