// ============================================================
// Layer 4 — Dataset Loader
// ============================================================
// Loads the labelled SMS corpus from a headerless two-column
// CSV file using the csv crate.
//
// File format (UTF-8, no header row):
//   ham,Ok lar... Joking wif u oni...
//   spam,"Free entry in 2 a wkly comp to win FA Cup final tkts..."
//
// Column 0 is the label ("spam" or "ham"), column 1 is the
// message text. Messages containing commas are quoted, which
// the csv reader handles for us.
//
// A missing file or a row with the wrong number of columns is
// a DataLoad error: training cannot proceed on a broken corpus.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use std::path::{Path, PathBuf};

use crate::domain::error::{ClassifierError, Result};
use crate::domain::record::RawRecord;
use crate::domain::traits::RecordSource;

/// Reads `(label, text)` rows from a headerless CSV file.
pub struct CsvLoader {
    /// Path to the dataset file
    path: PathBuf,
}

impl CsvLoader {
    /// Create a new CsvLoader pointed at a dataset file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Implement the RecordSource trait so the dataset layer can
/// call load_raw() without knowing about CSV internals
impl RecordSource for CsvLoader {
    fn load_raw(&self) -> Result<Vec<RawRecord>> {
        if !self.path.exists() {
            return Err(ClassifierError::DataLoad(format!(
                "dataset file '{}' does not exist",
                self.path.display()
            )));
        }

        // flexible(true) lets us report the bad row ourselves
        // instead of csv's generic UnequalLengths error
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| {
                ClassifierError::DataLoad(format!(
                    "cannot open '{}': {e}",
                    self.path.display()
                ))
            })?;

        let mut records = Vec::new();

        for (i, row) in reader.records().enumerate() {
            let row = row.map_err(|e| {
                ClassifierError::DataLoad(format!("row {}: {e}", i + 1))
            })?;

            if row.len() != 2 {
                return Err(ClassifierError::DataLoad(format!(
                    "row {} has {} columns, expected 2 (label, text)",
                    i + 1,
                    row.len()
                )));
            }

            records.push(RawRecord::new(&row[0], &row[1]));
        }

        tracing::info!(
            "Loaded {} records from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}
