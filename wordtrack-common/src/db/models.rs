//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned word identifier (SQLite row id)
pub type WordId = i64;

/// Dictionary data attached to a word when it is first seen
///
/// Written once at creation; later observations never replace it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub definition: Option<String>,
    pub pronunciation: Option<String>,
    pub part_of_speech: Option<String>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        self.definition.is_none() && self.pronunciation.is_none() && self.part_of_speech.is_none()
    }
}

/// Where a word was last copied from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Identifier of the application that owned the clipboard
    pub source_app: Option<String>,
    /// Full clipboard text the word was extracted from
    pub copied_text: Option<String>,
}

/// Persisted word row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub id: WordId,
    /// Lower-cased word, unique across the store
    pub word: String,
    #[serde(flatten)]
    pub enrichment: Enrichment,
    #[serde(flatten)]
    pub provenance: Provenance,
    pub date_added: DateTime<Utc>,
    pub is_favorite: bool,
    pub usage_count: i64,
}

/// Word about to be inserted (no id yet)
#[derive(Debug, Clone, PartialEq)]
pub struct NewWord {
    pub word: String,
    pub enrichment: Enrichment,
    pub provenance: Provenance,
    pub date_added: DateTime<Utc>,
}

impl NewWord {
    /// First observation of `word`, which must already be in canonical (lower-case) form
    pub fn new(word: impl Into<String>, enrichment: Enrichment, provenance: Provenance) -> Self {
        Self {
            word: word.into(),
            enrichment,
            provenance,
            date_added: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrichment_is_empty() {
        assert!(Enrichment::default().is_empty());

        let enrichment = Enrichment {
            part_of_speech: Some("noun".to_string()),
            ..Default::default()
        };
        assert!(!enrichment.is_empty());
    }

    #[test]
    fn test_word_entry_serializes_flat() {
        let entry = WordEntry {
            id: 7,
            word: "lucid".to_string(),
            enrichment: Enrichment {
                definition: Some("Clear; easily understood.".to_string()),
                pronunciation: None,
                part_of_speech: Some("adjective".to_string()),
            },
            provenance: Provenance::default(),
            date_added: Utc::now(),
            is_favorite: false,
            usage_count: 1,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["word"], "lucid");
        assert_eq!(json["part_of_speech"], "adjective");
        assert_eq!(json["usage_count"], 1);
        assert!(json.get("enrichment").is_none());
    }
}
