use crate::{
    extract_document, DocumentFingerprint, DocumentFormat, ExtractionResult, IngestError,
    KeywordConfig, KeywordError, KeywordRanker, ParseReport, ParseStatus,
};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub const EMPTY_TEXT_MESSAGE: &str = "No text could be extracted from the file";
pub const UNSUPPORTED_MESSAGE: &str = "unsupported";

pub fn discover_documents(folder: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_document = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(DocumentFormat::from_extension)
            .is_some();

        if is_document {
            files.push(entry.path().to_path_buf());
        }
    }

    if files.is_empty() {
        return Err(IngestError::InvalidArgument(format!(
            "no supported documents found in {}",
            folder.display()
        )));
    }

    files.sort_unstable();
    Ok(files)
}

pub fn digest_file(path: &Path) -> Result<String, IngestError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn parse_document(path: &Path, config: &KeywordConfig) -> Result<ParseReport, KeywordError> {
    let ranker = KeywordRanker::new(config)?;
    let document = fingerprint_document(path, None);
    Ok(parse_with_ranker(path, document, &ranker))
}

#[derive(Debug)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct IngestionReport {
    pub reports: Vec<ParseReport>,
    pub skipped_files: Vec<SkippedDocument>,
}

impl IngestionReport {
    pub fn from_outcomes(
        outcomes: impl IntoIterator<Item = Result<ParseReport, SkippedDocument>>,
    ) -> Self {
        let mut reports = Vec::new();
        let mut skipped_files = Vec::new();

        for outcome in outcomes {
            match outcome {
                Ok(report) => reports.push(report),
                Err(skipped) => skipped_files.push(skipped),
            }
        }

        Self {
            reports,
            skipped_files,
        }
    }

    pub fn parsed_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|report| report.status == ParseStatus::Parsed)
            .count()
    }
}

// a file is skipped only when it cannot be fingerprinted; extraction
// problems still produce a report
pub fn parse_discovered(
    path: PathBuf,
    ranker: &KeywordRanker,
) -> Result<ParseReport, SkippedDocument> {
    match build_document_fingerprint(&path) {
        Ok(document) => Ok(parse_with_ranker(&path, document, ranker)),
        Err(error) => Err(SkippedDocument {
            path,
            reason: error.to_string(),
        }),
    }
}

pub fn parse_folder_best_effort(
    folder: &Path,
    config: &KeywordConfig,
) -> Result<IngestionReport, IngestError> {
    let ranker = KeywordRanker::new(config)?;
    let files = discover_documents(folder)?;

    let report = IngestionReport::from_outcomes(
        files
            .into_iter()
            .map(|path| parse_discovered(path, &ranker)),
    );

    info!(
        folder = %folder.display(),
        parsed = report.parsed_count(),
        reports = report.reports.len(),
        skipped = report.skipped_files.len(),
        "parsed document folder"
    );

    Ok(report)
}

fn parse_with_ranker(
    path: &Path,
    document: DocumentFingerprint,
    ranker: &KeywordRanker,
) -> ParseReport {
    if document.format.is_none() {
        return failed_report(
            document,
            ParseStatus::UnsupportedFormat,
            UNSUPPORTED_MESSAGE.to_string(),
        );
    }

    let text = match extract_document(path) {
        ExtractionResult::Text(text) => text,
        ExtractionResult::UnsupportedFormat(reason) => {
            return failed_report(document, ParseStatus::UnsupportedFormat, reason)
        }
        ExtractionResult::ExtractionFailed(reason) => {
            return failed_report(document, ParseStatus::ExtractionFailed, reason)
        }
    };

    if text.trim().is_empty() {
        return failed_report(document, ParseStatus::EmptyText, EMPTY_TEXT_MESSAGE.to_string());
    }

    let keywords = ranker.rank(&text);
    debug!(
        path = %path.display(),
        keywords = keywords.len(),
        status = ?keywords.status(),
        "ranked document"
    );

    ParseReport {
        document,
        parsed_text: text,
        keywords: keywords.into_terms(),
        status: ParseStatus::Parsed,
        error: None,
    }
}

fn failed_report(document: DocumentFingerprint, status: ParseStatus, reason: String) -> ParseReport {
    ParseReport {
        document,
        parsed_text: String::new(),
        keywords: Vec::new(),
        status,
        error: Some(reason),
    }
}

fn build_document_fingerprint(path: &Path) -> Result<DocumentFingerprint, IngestError> {
    let checksum = digest_file(path)?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            IngestError::MissingFileName(format!("path missing filename: {}", path.display()))
        })?;

    Ok(DocumentFingerprint {
        file_name: name.to_string(),
        ..fingerprint_document(path, Some(checksum))
    })
}

// unreadable files get an empty checksum; extraction reports the real error
fn fingerprint_document(path: &Path, checksum: Option<String>) -> DocumentFingerprint {
    let checksum = checksum.or_else(|| digest_file(path).ok()).unwrap_or_default();
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(DocumentFormat::from_extension);

    DocumentFingerprint {
        document_id: generate_document_id(path),
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default(),
        source_path: path.to_string_lossy().to_string(),
        format,
        checksum,
        parsed_at: Utc::now(),
    }
}

fn generate_document_id(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    format!("{:x}", hasher.finalize())
}
