// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train`   — fits the pipeline on the SMS corpus and
//                  writes the artifact and metrics
//   2. `predict` — scores messages given on the command line
//                  or a CSV file of messages
//   3. `metrics` — prints the validation metrics of the last
//                  training run
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use std::{
    fs::File,
    io::{self, BufWriter},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use commands::{Commands, MetricsArgs, PredictArgs, TrainArgs};

use crate::application::{
    scoring_pipeline::ScoringPipeline,
    train_use_case::{TrainConfig, TrainUseCase},
};
use crate::data::batch::BatchTable;
use crate::domain::record::label_name;
use crate::infra::metrics::{MetricsStore, SplitMetrics};
use crate::ml::evaluation::EvaluationReport;

/// The main CLI struct, parsed by clap's derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "spam-classifier",
    version,
    about = "Train a TF-IDF + logistic regression SMS spam filter, then classify messages."
)]
pub struct Cli {
    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
            Commands::Metrics(args) => run_metrics(args),
        }
    }
}

/// Handles the `train` subcommand.
fn run_train(args: TrainArgs) -> Result<()> {
    let config: TrainConfig = args.into();
    tracing::info!("Starting training on '{}'", config.data_path);

    let outcome = TrainUseCase::new(config.clone())
        .execute()
        .context("training failed")?;

    if !outcome.report.converged {
        println!(
            "Warning: solver stopped after {} iterations without converging.",
            outcome.report.iterations
        );
    }
    if let Some(notice) = undefined_splits_notice(&outcome.metrics) {
        println!("{notice}");
    }

    for line in validation_lines(&outcome.metrics) {
        println!("{line}");
    }

    println!(
        "Saved pipeline to '{}', metrics to '{}'.",
        config.artifact_store().artifact_path().display(),
        config.metrics_store().path().display()
    );
    Ok(())
}

/// Handles the `predict` subcommand.
fn run_predict(args: PredictArgs) -> Result<()> {
    let scoring = ScoringPipeline::new(args.storage.into());

    if let Some(input) = &args.input {
        let file = File::open(input)
            .with_context(|| format!("cannot open '{}'", input.display()))?;
        let table = BatchTable::read(file)
            .with_context(|| format!("cannot read '{}'", input.display()))?;

        let predictions = scoring.predict_texts(&table.texts());
        if predictions.is_fallback() {
            eprintln!("{FALLBACK_WARNING}");
        }

        match &args.output {
            Some(path) => {
                let out = File::create(path)
                    .with_context(|| format!("cannot create '{}'", path.display()))?;
                table.write_with_predictions(BufWriter::new(out), &predictions)?;
                println!("Wrote {} predictions to '{}'.", predictions.len(), path.display());
            }
            None => table.write_with_predictions(io::stdout().lock(), &predictions)?,
        }
        return Ok(());
    }

    validate_texts(&args.text)?;

    let predictions = scoring.predict_texts(&args.text);
    if predictions.is_fallback() {
        eprintln!("{FALLBACK_WARNING}");
    }
    for ((text, &label), &prob) in args
        .text
        .iter()
        .zip(&predictions.labels)
        .zip(&predictions.probabilities)
    {
        println!("{}", format_prediction(text, label, prob));
    }
    Ok(())
}

/// Handles the `metrics` subcommand.
fn run_metrics(args: MetricsArgs) -> Result<()> {
    for line in metrics_report(&MetricsStore::new(&args.results_dir))? {
        println!("{line}");
    }
    Ok(())
}

const FALLBACK_WARNING: &str = "Warning: no trained model available, every message is labelled HAM.";

/// Messages given with `--text`: at least one, none blank.
fn validate_texts(texts: &[String]) -> Result<()> {
    if texts.is_empty() {
        bail!("nothing to classify: pass --text \"message\" or --input file.csv");
    }
    if texts.iter().any(|t| t.trim().is_empty()) {
        bail!("please enter a message: --text must not be blank");
    }
    Ok(())
}

/// `SPAM (spam probability 0.982): free money now`
fn format_prediction(text: &str, label: u8, prob: f64) -> String {
    format!("{} (spam probability {prob:.3}): {text}", label_name(label))
}

fn undefined_splits_notice(metrics: &SplitMetrics) -> Option<String> {
    let undefined = metrics.undefined();
    if undefined.is_empty() {
        return None;
    }
    Some(format!(
        "Note: metrics undefined for {} (single-class split), written as null.",
        undefined.join(", ")
    ))
}

fn validation_lines(metrics: &SplitMetrics) -> Vec<String> {
    match &metrics.val {
        Some(report) => std::iter::once("Validation metrics:".to_string())
            .chain(scalar_lines(report))
            .collect(),
        None => vec!["Validation metrics are undefined for this run.".to_string()],
    }
}

/// What the `metrics` command prints.
fn metrics_report(store: &MetricsStore) -> Result<Vec<String>> {
    match store.load()? {
        Some(metrics) => Ok(validation_lines(&metrics)),
        None => Ok(vec![format!(
            "No metrics yet at '{}'. Run `spam-classifier train` first.",
            store.path().display()
        )]),
    }
}

fn scalar_lines(report: &EvaluationReport) -> impl Iterator<Item = String> + '_ {
    report
        .scalars()
        .into_iter()
        .map(|(name, value)| format!("  {name:<10} {value:.3}"))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> EvaluationReport {
        EvaluationReport::compute(&[0, 1, 1, 0], &[0, 1, 0, 0], &[0.1, 0.9, 0.4, 0.2]).unwrap()
    }

    #[test]
    fn test_blank_text_rejected() {
        let err = validate_texts(&["hello".to_string(), "   ".to_string()]).unwrap_err();
        assert!(err.to_string().contains("blank"));
        assert!(validate_texts(&[String::new()]).is_err());
    }

    #[test]
    fn test_no_text_rejected() {
        assert!(validate_texts(&[]).is_err());
    }

    #[test]
    fn test_real_text_accepted() {
        assert!(validate_texts(&["free prize".to_string(), "hi".to_string()]).is_ok());
    }

    #[test]
    fn test_format_prediction() {
        assert_eq!(
            format_prediction("win cash now", 1, 0.98765),
            "SPAM (spam probability 0.988): win cash now"
        );
        assert_eq!(
            format_prediction("see you at six", 0, 0.0),
            "HAM (spam probability 0.000): see you at six"
        );
    }

    #[test]
    fn test_metrics_without_file() {
        let dir   = tempfile::tempdir().unwrap();
        let store = MetricsStore::new(dir.path());
        let lines = metrics_report(&store).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("No metrics yet"));
        let args = MetricsArgs { results_dir: dir.path().display().to_string() };
        assert!(run_metrics(args).is_ok());
    }

    #[test]
    fn test_metrics_prints_validation_block() {
        let dir   = tempfile::tempdir().unwrap();
        let store = MetricsStore::new(dir.path());
        store
            .save(&SplitMetrics { val: Some(report()), ..SplitMetrics::default() })
            .unwrap();
        let lines = metrics_report(&store).unwrap();
        assert_eq!(lines[0], "Validation metrics:");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "  accuracy   0.750");
        assert!(!lines.iter().any(|l| l.contains("confusion")));
    }

    #[test]
    fn test_undefined_splits_notice() {
        let all = SplitMetrics {
            train: Some(report()),
            val:   Some(report()),
            test:  Some(report()),
        };
        assert_eq!(undefined_splits_notice(&all), None);

        let nulled = SplitMetrics { val: None, ..all };
        let notice = undefined_splits_notice(&nulled).unwrap();
        assert!(notice.contains("val"));
        assert!(!notice.contains("train"));
    }
}
