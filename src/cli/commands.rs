// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands `train`, `predict` and
// `metrics` and all their configurable flags.
//
// Storage paths shared by every command live in StorageArgs
// and can also be set through environment variables:
//   SPAM_DATA_PATH, SPAM_MODEL_DIR, SPAM_RESULTS_DIR
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::application::train_use_case::TrainConfig;
use crate::ml::classifier::ClassBalance;

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the spam classifier on the labelled SMS corpus
    Train(TrainArgs),

    /// Classify messages with the saved model (trains one if missing)
    Predict(PredictArgs),

    /// Show the validation metrics of the last training run
    Metrics(MetricsArgs),
}

/// Where data is read from and results are written to.
#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    /// Headerless CSV of (label, text) rows
    #[arg(long, env = "SPAM_DATA_PATH", default_value = "data/raw/sms_spam_no_header.csv")]
    pub data_path: String,

    /// Directory holding pipeline.bin and train_config.json
    #[arg(long, env = "SPAM_MODEL_DIR", default_value = "models/phase1")]
    pub model_dir: String,

    /// Directory holding metrics.json
    #[arg(long, env = "SPAM_RESULTS_DIR", default_value = "results/phase1")]
    pub results_dir: String,
}

/// Class weighting as accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ClassBalanceArg {
    Balanced,
    None,
}

impl From<ClassBalanceArg> for ClassBalance {
    fn from(a: ClassBalanceArg) -> Self {
        match a {
            ClassBalanceArg::Balanced => ClassBalance::Balanced,
            ClassBalanceArg::None     => ClassBalance::None,
        }
    }
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Fraction of the corpus held out for the test set
    #[arg(long, default_value_t = 0.15)]
    pub test_size: f64,

    /// Fraction of the corpus held out for validation
    #[arg(long, default_value_t = 0.15)]
    pub val_size: f64,

    /// Seed for the stratified shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Upper bound on vocabulary size
    #[arg(long, default_value_t = 10_000)]
    pub max_features: usize,

    /// Longest word n-gram used as a feature
    #[arg(long, default_value_t = 2)]
    pub max_ngram: usize,

    /// Drop terms seen in fewer documents than this
    #[arg(long, default_value_t = 1)]
    pub min_df: usize,

    /// Drop terms seen in more than this fraction of documents
    #[arg(long, default_value_t = 0.95)]
    pub max_df: f64,

    /// Inverse L2 regularization strength (C)
    #[arg(long, default_value_t = 1.0)]
    pub regularization: f64,

    /// How the two classes are weighted in the loss
    #[arg(long, value_enum, default_value_t = ClassBalanceArg::Balanced)]
    pub class_balance: ClassBalanceArg,

    /// Newton iteration budget for the solver
    #[arg(long, default_value_t = 100)]
    pub max_iter: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:      a.storage.data_path,
            model_dir:      a.storage.model_dir,
            results_dir:    a.storage.results_dir,
            test_size:      a.test_size,
            val_size:       a.val_size,
            seed:           a.seed,
            max_features:   a.max_features,
            max_ngram:      a.max_ngram,
            min_df:         a.min_df,
            max_df:         a.max_df,
            regularization: a.regularization,
            class_balance:  a.class_balance.into(),
            max_iter:       a.max_iter,
        }
    }
}

/// Default hyperparameters, with paths from the command line.
impl From<StorageArgs> for TrainConfig {
    fn from(s: StorageArgs) -> Self {
        TrainConfig {
            data_path:   s.data_path,
            model_dir:   s.model_dir,
            results_dir: s.results_dir,
            ..TrainConfig::default()
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Message to classify; repeat for several
    #[arg(long, conflicts_with = "input")]
    pub text: Vec<String>,

    /// Headered CSV with a `text` column to classify in bulk
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Where to write the scored CSV (stdout when omitted)
    #[arg(long, requires = "input")]
    pub output: Option<PathBuf>,
}

/// All arguments for the `metrics` command
#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// Directory holding metrics.json
    #[arg(long, env = "SPAM_RESULTS_DIR", default_value = "results/phase1")]
    pub results_dir: String,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from([
            "spam-classifier",
            "train",
            "--data-path", "d.csv",
            "--model-dir", "m",
            "--results-dir", "r",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(
            cfg,
            TrainConfig {
                data_path:   "d.csv".into(),
                model_dir:   "m".into(),
                results_dir: "r".into(),
                ..TrainConfig::default()
            }
        );
    }

    #[test]
    fn test_train_overrides() {
        let cli = Cli::try_parse_from([
            "spam-classifier",
            "train",
            "--max-features", "500",
            "--max-ngram", "1",
            "--regularization", "0.1",
            "--class-balance", "none",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.max_features, 500);
        assert_eq!(cfg.max_ngram, 1);
        assert_eq!(cfg.regularization, 0.1);
        assert_eq!(cfg.class_balance, ClassBalance::None);
    }

    #[test]
    fn test_predict_repeatable_text() {
        let cli = Cli::try_parse_from([
            "spam-classifier", "predict", "--text", "hi there", "--text", "WIN NOW",
        ])
        .unwrap();
        let Commands::Predict(args) = cli.command else { panic!("expected predict") };
        assert_eq!(args.text, vec!["hi there".to_string(), "WIN NOW".to_string()]);
        assert!(args.input.is_none());
    }

    #[test]
    fn test_predict_text_conflicts_with_input() {
        let res = Cli::try_parse_from([
            "spam-classifier", "predict", "--text", "hi", "--input", "batch.csv",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_output_requires_input() {
        let res = Cli::try_parse_from(["spam-classifier", "predict", "--output", "out.csv"]);
        assert!(res.is_err());
    }
}
