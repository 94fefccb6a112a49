// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every failure the classifier core can report, as one enum.
//
// The prediction boundary (ScoringPipeline::predict_texts)
// matches on these variants to decide when to answer with the
// all-ham fallback. Anything that is not a ClassifierError
// (a panic, a bug) is never converted.
//
// Reference: Rust Book §9 (Recoverable Errors with Result)
//            thiserror crate documentation

use thiserror::Error;

/// Result alias used throughout the classifier core.
pub type Result<T> = std::result::Result<T, ClassifierError>;

#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Dataset file missing, unreadable, or with malformed rows
    #[error("data load error: {0}")]
    DataLoad(String),

    /// Split fractions outside the open interval (0, 1)
    #[error("invalid split config: {0}")]
    InvalidSplitConfig(String),

    /// transform / predict called before fit
    #[error("{0} is not fitted yet")]
    NotFitted(&'static str),

    /// A metric that cannot be computed for the given labels
    #[error("metric undefined: {0}")]
    MetricUndefined(String),

    /// Persisted pipeline exists but cannot be decoded
    #[error("artifact corrupt at '{path}': {reason}")]
    ArtifactCorrupt { path: String, reason: String },

    /// No term survived document-frequency pruning
    #[error("empty vocabulary: {0}")]
    EmptyVocabulary(String),

    /// Shape or label problems in caller-supplied data
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClassifierError {
    /// Short stable name for logs and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierError::DataLoad(_)             => "DataLoadError",
            ClassifierError::InvalidSplitConfig(_)   => "InvalidSplitConfig",
            ClassifierError::NotFitted(_)            => "NotFittedError",
            ClassifierError::MetricUndefined(_)      => "MetricUndefinedError",
            ClassifierError::ArtifactCorrupt { .. }  => "ArtifactCorruptError",
            ClassifierError::EmptyVocabulary(_)      => "EmptyVocabulary",
            ClassifierError::InvalidInput(_)         => "InvalidInput",
            ClassifierError::Io(_)                   => "Io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(ClassifierError::NotFitted("TextFeaturizer").kind(), "NotFittedError");
        let e = ClassifierError::ArtifactCorrupt {
            path:   "x.bin".into(),
            reason: "truncated".into(),
        };
        assert_eq!(e.kind(), "ArtifactCorruptError");
        assert!(e.to_string().contains("x.bin"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: ClassifierError = io.into();
        assert_eq!(e.kind(), "Io");
    }
}
