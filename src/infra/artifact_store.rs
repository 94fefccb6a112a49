// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Saves and restores the trained pipeline with bincode.
//
// What gets written to the model directory:
//   1. pipeline.bin        — versioned bincode envelope holding
//                            vocabulary, IDF weights, classifier
//                            coefficients, bias and class weights
//   2. train_config.json   — the TrainConfig of the run that
//                            produced pipeline.bin
//
// File naming convention:
//   models/phase1/
//     pipeline.bin
//     train_config.json
//
// Writes go to a temporary file in the same directory which
// is then renamed over the target, so a reader in another
// process sees either the old artifact or the new one, never
// half of one. Concurrent writers still race; last rename wins.
//
// A missing artifact is not an error: load() returns None and
// the caller decides whether to train or fall back. An artifact
// that decodes but whose parts disagree (IDF weights vs.
// vocabulary vs. coefficients) is ArtifactCorrupt, same as one
// that does not decode.
//
// Reference: bincode crate documentation
//            tempfile crate documentation (NamedTempFile::persist)

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::application::train_use_case::TrainConfig;
use crate::domain::error::{ClassifierError, Result};
use crate::ml::pipeline::TrainedPipeline;

/// File name of the serialized pipeline inside the model directory.
pub const ARTIFACT_FILE: &str = "pipeline.bin";

/// File name of the training configuration inside the model directory.
pub const CONFIG_FILE: &str = "train_config.json";

/// Bumped whenever the serialized layout of TrainedPipeline changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ArtifactRef<'a> {
    format_version: u32,
    pipeline:       &'a TrainedPipeline,
}

#[derive(Deserialize)]
struct Artifact {
    format_version: u32,
    pipeline:       TrainedPipeline,
}

/// Manages the persisted pipeline and its config.
pub struct ArtifactStore {
    /// Directory holding pipeline.bin and train_config.json
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.dir.join(ARTIFACT_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn exists(&self) -> bool {
        self.artifact_path().is_file()
    }

    /// Serialize the pipeline, replacing any previous artifact.
    pub fn save(&self, pipeline: &TrainedPipeline) -> Result<()> {
        let path = self.artifact_path();
        let envelope = ArtifactRef {
            format_version: ARTIFACT_FORMAT_VERSION,
            pipeline,
        };

        write_atomically(&path, |writer| {
            bincode::serialize_into(writer, &envelope)
                .map_err(|e| ClassifierError::Io(std::io::Error::other(e.to_string())))
        })?;

        tracing::info!("Saved pipeline to '{}'", path.display());
        Ok(())
    }

    /// Read the pipeline back. `Ok(None)` when no artifact exists yet.
    pub fn load(&self) -> Result<Option<TrainedPipeline>> {
        let path = self.artifact_path();
        if !path.exists() {
            tracing::debug!("No artifact at '{}'", path.display());
            return Ok(None);
        }

        let corrupt = |reason: String| ClassifierError::ArtifactCorrupt {
            path: path.display().to_string(),
            reason,
        };

        // Decode from memory: slice reads are bounds-checked, so a damaged
        // length prefix fails instead of allocating whatever it claims.
        let bytes = fs::read(&path).map_err(|e| corrupt(e.to_string()))?;
        let artifact: Artifact = bincode::deserialize(&bytes)
            .map_err(|e| corrupt(e.to_string()))?;

        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(corrupt(format!(
                "format version {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        artifact
            .pipeline
            .check_consistency()
            .map_err(|e| corrupt(e.to_string()))?;

        tracing::info!("Loaded pipeline from '{}'", path.display());
        Ok(Some(artifact.pipeline))
    }

    /// Save the training configuration as pretty JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.config_path();
        let json = serde_json::to_string_pretty(cfg)
            .map_err(|e| ClassifierError::Io(std::io::Error::other(e.to_string())))?;

        write_atomically(&path, |writer| {
            writer.write_all(json.as_bytes())?;
            Ok(())
        })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the configuration of the run that produced the current artifact.
    pub fn load_config(&self) -> Result<Option<TrainConfig>> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| ClassifierError::ArtifactCorrupt {
                path:   path.display().to_string(),
                reason: e.to_string(),
            })
    }
}

/// Write through a temp file in the target's directory, then rename over the target.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<()>,
{
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp.persist(path).map_err(|e| ClassifierError::Io(e.error))?;
    Ok(())
}
