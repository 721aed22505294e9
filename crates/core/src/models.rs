use crate::error::KeywordError;
use crate::stopwords::StopwordFilter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_N: usize = 30;
pub const DEFAULT_MAX_VOCABULARY: usize = 2_000;
pub const NGRAM_RANGE: (usize, usize) = (1, 2);

#[derive(Debug, Clone)]
pub struct KeywordConfig {
    pub top_n: usize,
    pub max_vocabulary: usize,
    pub stopwords: StopwordFilter,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            max_vocabulary: DEFAULT_MAX_VOCABULARY,
            stopwords: StopwordFilter::english(),
        }
    }
}

impl KeywordConfig {
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_max_vocabulary(mut self, max_vocabulary: usize) -> Self {
        self.max_vocabulary = max_vocabulary;
        self
    }

    pub fn with_stopwords(mut self, stopwords: StopwordFilter) -> Self {
        self.stopwords = stopwords;
        self
    }

    pub fn validate(&self) -> Result<(), KeywordError> {
        if self.top_n < 1 {
            return Err(KeywordError::InvalidConfiguration(format!(
                "top_n must be at least 1, got {}",
                self.top_n
            )));
        }
        if self.max_vocabulary < 1 {
            return Err(KeywordError::InvalidConfiguration(format!(
                "max_vocabulary must be at least 1, got {}",
                self.max_vocabulary
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermWeight {
    pub term: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankStatus {
    Ranked,
    EmptyVocabulary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordList {
    pub entries: Vec<TermWeight>,
    pub vocabulary_size: usize,
}

impl KeywordList {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            vocabulary_size: 0,
        }
    }

    pub fn status(&self) -> RankStatus {
        if self.vocabulary_size == 0 {
            RankStatus::EmptyVocabulary
        } else {
            RankStatus::Ranked
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn terms(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.term.as_str()).collect()
    }

    pub fn into_terms(self) -> Vec<String> {
        self.entries.into_iter().map(|entry| entry.term).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
    LegacyDoc,
}

impl DocumentFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            "doc" => Some(Self::LegacyDoc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Text(String),
    UnsupportedFormat(String),
    ExtractionFailed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFingerprint {
    pub document_id: String,
    pub file_name: String,
    pub source_path: String,
    pub format: Option<DocumentFormat>,
    pub checksum: String,
    pub parsed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    Parsed,
    EmptyText,
    UnsupportedFormat,
    ExtractionFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseReport {
    pub document: DocumentFingerprint,
    pub parsed_text: String,
    pub keywords: Vec<String>,
    pub status: ParseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = KeywordConfig::default();
        assert_eq!(config.top_n, 30);
        assert_eq!(config.max_vocabulary, 2_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let zero_top = KeywordConfig::default().with_top_n(0);
        assert!(matches!(
            zero_top.validate(),
            Err(KeywordError::InvalidConfiguration(_))
        ));

        let zero_vocab = KeywordConfig::default().with_max_vocabulary(0);
        assert!(matches!(
            zero_vocab.validate(),
            Err(KeywordError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("Docx"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("doc"), Some(DocumentFormat::LegacyDoc));
        assert_eq!(DocumentFormat::from_extension("rtf"), None);
    }
}
