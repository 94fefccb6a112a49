//! SMS spam classifier: TF-IDF features, logistic regression, and a
//! scoring pipeline that persists its model and falls back to
//! labelling everything ham when no model can be loaded or trained.
//!
//! Layers, outermost first:
//!
//! - [`cli`]         — clap commands (`train`, `predict`, `metrics`)
//! - [`application`] — training run and the scoring pipeline
//! - [`domain`]      — records, predictions, errors, traits
//! - [`data`]        — CSV loading, cleaning, stratified splits
//! - [`ml`]          — featurizer, classifier, metrics, pipelines
//! - [`infra`]       — artifact and metrics persistence

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod infra;
pub mod ml;
