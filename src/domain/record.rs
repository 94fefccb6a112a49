// ============================================================
// Layer 3 — Message Records
// ============================================================
// The two shapes a labelled SMS takes on its way through the
// system:
//
//   RawRecord       — exactly what the CSV row says
//                     ("spam"/"ham", original text)
//   PreparedRecord  — label binarised (1 = spam), text
//                     lowercased and trimmed
//
// Reference: Rust Book §5 (Structs), §6 (Enums)

use serde::{Deserialize, Serialize};

/// Label string that marks a message as spam. Any other value is ham.
pub const SPAM_LABEL: &str = "spam";

/// Label string for legitimate messages.
pub const HAM_LABEL: &str = "ham";

/// One row of the dataset file, before any cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub label: String,
    pub text:  String,
}

impl RawRecord {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text:  text.into(),
        }
    }
}

/// A cleaned record ready for featurisation.
///
/// `label` is always 0 (ham) or 1 (spam).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedRecord {
    pub label: u8,
    pub text:  String,
}

impl PreparedRecord {
    pub fn is_spam(&self) -> bool {
        self.label == 1
    }
}

/// Human-readable name for a binary label.
pub fn label_name(label: u8) -> &'static str {
    if label == 1 { "SPAM" } else { "HAM" }
}

/// Splits a slice of prepared records into parallel text / label vectors.
pub fn texts_and_labels(records: &[PreparedRecord]) -> (Vec<String>, Vec<u8>) {
    records
        .iter()
        .map(|r| (r.text.clone(), r.label))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_name() {
        assert_eq!(label_name(1), "SPAM");
        assert_eq!(label_name(0), "HAM");
    }

    #[test]
    fn test_texts_and_labels_keeps_order() {
        let records = vec![
            PreparedRecord { label: 0, text: "a".into() },
            PreparedRecord { label: 1, text: "b".into() },
        ];
        let (texts, labels) = texts_and_labels(&records);
        assert_eq!(texts, vec!["a", "b"]);
        assert_eq!(labels, vec![0, 1]);
    }
}
