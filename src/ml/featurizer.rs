// ============================================================
// Layer 5 — TF-IDF Text Featurizer
// ============================================================
// Converts messages into sparse TF-IDF vectors over word
// n-grams.
//
// Tokenisation:
//   A word is a run of 2+ word characters (letters, digits,
//   underscore). Case is taken as given: the preprocessor has
//   already lowercased the corpus. N-grams are contiguous word
//   windows joined by one space, for every n in [min_n, max_n].
//
//   "win free money" with (1, 2) →
//     win, free, money, "win free", "free money"
//
// Vocabulary (fit):
//   1. Count document frequency (df) of every n-gram
//   2. Drop terms with df < min_df or df > max_df * n_docs
//   3. Keep the max_features terms with the highest df
//      (ties broken alphabetically)
//   4. Index the survivors in alphabetical order
//
// Weights (transform):
//   tf(t, d)  = raw count of t in d
//   idf(t)    = ln((1 + n_docs) / (1 + df(t))) + 1
//   each row is then L2-normalised
//
// Reference: Manning et al. (2008) Introduction to IR, §6.2
//            Rust Book §8 (Hash Maps)

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::error::{ClassifierError, Result};
use crate::ml::sparse::{SparseMatrix, SparseRow};

/// Featurizer hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturizerConfig {
    /// Upper bound on vocabulary size
    pub max_features: usize,
    /// Inclusive n-gram range `(min_n, max_n)`
    pub ngram_range:  (usize, usize),
    /// Minimum number of documents a term must appear in
    pub min_df:       usize,
    /// Maximum fraction of documents a term may appear in
    pub max_df:       f64,
}

impl Default for FeaturizerConfig {
    fn default() -> Self {
        Self {
            max_features: 10_000,
            ngram_range:  (1, 2),
            min_df:       1,
            max_df:       0.95,
        }
    }
}

impl FeaturizerConfig {
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.ngram_range = (min_n, max_n);
        self
    }

    fn validate(&self) -> Result<()> {
        let (lo, hi) = self.ngram_range;
        if lo == 0 || lo > hi {
            return Err(ClassifierError::InvalidInput(format!(
                "n-gram range ({lo}, {hi}) must satisfy 1 <= min_n <= max_n"
            )));
        }
        if self.max_features == 0 {
            return Err(ClassifierError::InvalidInput("max_features must be positive".into()));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(ClassifierError::InvalidInput(format!(
                "max_df {} must be in (0, 1]",
                self.max_df
            )));
        }
        Ok(())
    }
}

/// Frozen term → column mapping learned by `fit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Builds a vocabulary whose columns follow alphabetical term order.
    fn from_terms(mut terms: Vec<String>) -> Self {
        terms.sort_unstable();
        let index = terms.into_iter().enumerate().map(|(i, t)| (t, i)).collect();
        Self { index }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }
}

/// Vocabulary plus one IDF weight per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FittedState {
    vocabulary: Vocabulary,
    idf:        Vec<f64>,
}

/// TF-IDF vectorizer over word n-grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFeaturizer {
    config: FeaturizerConfig,
    state:  Option<FittedState>,
}

impl TextFeaturizer {
    pub fn new(config: FeaturizerConfig) -> Self {
        Self { config, state: None }
    }

    pub fn config(&self) -> &FeaturizerConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Learned vocabulary, if fitted.
    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.state.as_ref().map(|s| &s.vocabulary)
    }

    /// Learned IDF weights, indexed by column.
    pub fn idf(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.idf.as_slice())
    }

    /// Learn vocabulary and IDF weights, replacing any previous fit.
    pub fn fit<S: AsRef<str>>(&mut self, texts: &[S]) -> Result<&mut Self> {
        self.config.validate()?;
        if texts.is_empty() {
            return Err(ClassifierError::EmptyVocabulary("cannot fit on zero documents".into()));
        }

        let n_docs = texts.len();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for text in texts {
            let unique: HashSet<String> = ngrams(text.as_ref(), self.config.ngram_range)
                .into_iter()
                .collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let max_doc_count = self.config.max_df * n_docs as f64;
        let mut kept: Vec<(String, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= self.config.min_df && (*df as f64) <= max_doc_count)
            .collect();

        if kept.is_empty() {
            return Err(ClassifierError::EmptyVocabulary(format!(
                "no terms remain after pruning {n_docs} documents"
            )));
        }

        // highest df first, alphabetical among equals
        kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        kept.truncate(self.config.max_features);

        let df_of: HashMap<&str, usize> = kept.iter().map(|(t, df)| (t.as_str(), *df)).collect();
        let vocabulary = Vocabulary::from_terms(kept.iter().map(|(t, _)| t.clone()).collect());

        let mut idf = vec![0.0; vocabulary.len()];
        for (term, &col) in &vocabulary.index {
            let df = df_of.get(term.as_str()).copied().unwrap_or(0);
            idf[col] = ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0;
        }

        tracing::debug!(
            "Featurizer fitted on {} documents: {} terms",
            n_docs,
            vocabulary.len()
        );

        self.state = Some(FittedState { vocabulary, idf });
        Ok(self)
    }

    /// Map texts onto the frozen vocabulary as L2-normalised TF-IDF rows.
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Result<SparseMatrix> {
        let state = self
            .state
            .as_ref()
            .ok_or(ClassifierError::NotFitted("TextFeaturizer"))?;

        let rows = texts
            .iter()
            .map(|text| tfidf_row(text.as_ref(), self.config.ngram_range, state))
            .collect();

        Ok(SparseMatrix::new(state.vocabulary.len(), rows))
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, texts: &[S]) -> Result<SparseMatrix> {
        self.fit(texts)?;
        self.transform(texts)
    }

    /// Checks a fitted state that came from outside `fit` (e.g. a decoded artifact).
    pub fn check_state(&self) -> Result<()> {
        let Some(state) = &self.state else {
            return Err(ClassifierError::NotFitted("TextFeaturizer"));
        };
        let n_terms = state.vocabulary.len();
        if state.idf.len() != n_terms {
            return Err(ClassifierError::InvalidInput(format!(
                "{} IDF weights for {} vocabulary terms",
                state.idf.len(),
                n_terms
            )));
        }
        let out_of_range = state.vocabulary.index.iter().find(|(_, col)| **col >= n_terms);
        if let Some((term, &col)) = out_of_range {
            return Err(ClassifierError::InvalidInput(format!(
                "term '{term}' maps to column {col}, vocabulary has {n_terms}"
            )));
        }
        if state.idf.iter().any(|w| !w.is_finite()) {
            return Err(ClassifierError::InvalidInput("non-finite IDF weight".into()));
        }
        Ok(())
    }
}

fn tfidf_row(text: &str, range: (usize, usize), state: &FittedState) -> SparseRow {
    let mut counts: HashMap<usize, f64> = HashMap::new();
    for term in ngrams(text, range) {
        if let Some(col) = state.vocabulary.get(&term) {
            *counts.entry(col).or_insert(0.0) += 1.0;
        }
    }

    let mut row: SparseRow = counts
        .into_iter()
        .filter_map(|(col, tf)| state.idf.get(col).map(|w| (col, tf * w)))
        .collect();
    row.sort_unstable_by_key(|&(col, _)| col);

    let norm = row.iter().map(|&(_, v)| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for entry in &mut row {
            entry.1 /= norm;
        }
    }
    row
}

/// Words of two or more word characters, in order.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().nth(1).is_some())
        .collect()
}

/// All contiguous word n-grams for n in `range`, joined by a space.
pub fn ngrams(text: &str, range: (usize, usize)) -> Vec<String> {
    let words = tokenize(text);
    let (lo, hi) = range;
    let mut out = Vec::new();
    for n in lo.max(1)..=hi {
        if n > words.len() {
            break;
        }
        out.extend(words.windows(n).map(|w| w.join(" ")));
    }
    out
}
