// ============================================================
// Layer 4 — Batch Prediction Files
// ============================================================
// Reads a user-supplied CSV of messages to classify and writes
// it back with two extra columns:
//
//   input:   id,text            output:  id,text,pred,spam_prob
//            1,free money now            1,free money now,SPAM,0.982
//
// Unlike the training corpus this file HAS a header row, and
// it must contain a column named "text". Every other column is
// carried through untouched.
//
// Reference: csv crate documentation

use std::io::{Read, Write};

use crate::domain::error::{ClassifierError, Result};
use crate::domain::prediction::Predictions;
use crate::domain::record::label_name;

/// Name of the column holding the messages to classify.
pub const TEXT_COLUMN: &str = "text";

/// A headered CSV table with a known text column.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchTable {
    pub headers:    Vec<String>,
    pub rows:       Vec<Vec<String>>,
    text_index:     usize,
}

impl BatchTable {
    /// Parse a headered CSV. Fails if there is no `text` column.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| ClassifierError::InvalidInput(format!("cannot read CSV header: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();

        let text_index = headers
            .iter()
            .position(|h| h.trim() == TEXT_COLUMN)
            .ok_or_else(|| {
                ClassifierError::InvalidInput(format!("CSV must contain a '{TEXT_COLUMN}' column"))
            })?;

        let mut rows = Vec::new();
        for (i, row) in csv_reader.records().enumerate() {
            let row = row.map_err(|e| {
                ClassifierError::InvalidInput(format!("row {}: {e}", i + 1))
            })?;
            rows.push(row.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows, text_index })
    }

    /// The message of every row; short rows yield an empty message.
    pub fn texts(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(self.text_index).cloned().unwrap_or_default())
            .collect()
    }

    /// Write the table plus `pred` and `spam_prob` columns.
    pub fn write_with_predictions<W: Write>(
        &self,
        writer:      W,
        predictions: &Predictions,
    ) -> Result<()> {
        if predictions.len() != self.rows.len() {
            return Err(ClassifierError::InvalidInput(format!(
                "{} predictions for {} rows",
                predictions.len(),
                self.rows.len()
            )));
        }

        let mut out = csv::Writer::from_writer(writer);
        let csv_err = |e: csv::Error| ClassifierError::InvalidInput(format!("cannot write CSV: {e}"));

        let mut header = self.headers.clone();
        header.push("pred".to_string());
        header.push("spam_prob".to_string());
        out.write_record(&header).map_err(csv_err)?;

        let width = self.headers.len();
        for ((row, &label), &prob) in self
            .rows
            .iter()
            .zip(&predictions.labels)
            .zip(&predictions.probabilities)
        {
            let mut record: Vec<String> = row.clone();
            // pad short rows so the new columns line up with the header
            record.resize(width.max(record.len()), String::new());
            record.push(label_name(label).to_string());
            record.push(format!("{prob:.3}"));
            out.write_record(&record).map_err(csv_err)?;
        }

        out.flush()?;
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::PredictionSource;

    #[test]
    fn test_reads_text_column() {
        let input = "id,text\n1,hello there\n2,\"win, win\"\n";
        let table = BatchTable::read(input.as_bytes()).unwrap();
        assert_eq!(table.texts(), vec!["hello there", "win, win"]);
    }

    #[test]
    fn test_missing_text_column() {
        let err = BatchTable::read("id,message\n1,hi\n".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
        assert!(err.to_string().contains("'text'"));
    }

    #[test]
    fn test_writes_pred_columns() {
        let table = BatchTable::read("id,text\n1,a\n2,b\n".as_bytes()).unwrap();
        let preds = Predictions::new(vec![1, 0], vec![0.91, 0.02], PredictionSource::Trained);

        let mut buf = Vec::new();
        table.write_with_predictions(&mut buf, &preds).unwrap();
        let out = String::from_utf8(buf).unwrap();

        assert_eq!(out, "id,text,pred,spam_prob\n1,a,SPAM,0.910\n2,b,HAM,0.020\n");
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let table = BatchTable::read("text\na\n".as_bytes()).unwrap();
        let err   = table
            .write_with_predictions(Vec::<u8>::new(), &Predictions::all_ham(2))
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }
}
