use crate::error::ExtractError;
use crate::models::{DocumentFormat, ExtractionResult};
use lopdf::Document;
use regex::{Captures, Regex};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;
use zip::ZipArchive;

const DOCX_BODY_PART: &str = "word/document.xml";

pub trait TextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        let document =
            Document::load(path).map_err(|error| ExtractError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| ExtractError::PdfParse(error.to_string()))?;

            if !text.trim().is_empty() {
                pages.push(text);
            }
        }

        Ok(pages.join("\n"))
    }
}

#[derive(Default)]
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        let mut archive = ZipArchive::new(File::open(path)?)?;
        let mut xml = String::new();
        match archive.by_name(DOCX_BODY_PART) {
            Ok(mut part) => {
                part.read_to_string(&mut xml)?;
            }
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(ExtractError::Docx(format!(
                    "{} has no {DOCX_BODY_PART}",
                    path.display()
                )));
            }
            Err(error) => return Err(error.into()),
        }

        docx_body_text(&xml)
    }
}

#[derive(Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = std::fs::read(path)?;
        Ok(decode_utf8_ignoring_invalid(&bytes))
    }
}

fn decode_utf8_ignoring_invalid(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

pub fn detect_format(path: &Path) -> Result<DocumentFormat, ExtractError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    DocumentFormat::from_extension(extension)
        .ok_or_else(|| ExtractError::UnsupportedFormat(format!(".{extension}")))
}

pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    match detect_format(path)? {
        DocumentFormat::Pdf => LopdfExtractor.extract_text(path),
        DocumentFormat::Docx => DocxExtractor.extract_text(path),
        DocumentFormat::Txt => PlainTextExtractor.extract_text(path),
        DocumentFormat::LegacyDoc => Err(ExtractError::LegacyFormat),
    }
}

pub fn extract_document(path: &Path) -> ExtractionResult {
    let result = ExtractionResult::from(extract_text(path));
    if let ExtractionResult::ExtractionFailed(reason) = &result {
        warn!(path = %path.display(), reason = %reason, "text extraction failed");
    }
    result
}

impl From<Result<String, ExtractError>> for ExtractionResult {
    fn from(value: Result<String, ExtractError>) -> Self {
        match value {
            Ok(text) => Self::Text(text),
            Err(error @ (ExtractError::UnsupportedFormat(_) | ExtractError::LegacyFormat)) => {
                Self::UnsupportedFormat(error.to_string())
            }
            Err(error) => Self::ExtractionFailed(error.to_string()),
        }
    }
}

#[derive(Default)]
struct DocxText {
    body: Vec<String>,
    cells: Vec<String>,
    cell_paragraphs: Vec<String>,
    paragraph: String,
    table_depth: usize,
    in_run: bool,
    in_text: bool,
}

impl DocxText {
    fn end_paragraph(&mut self) {
        let paragraph = std::mem::take(&mut self.paragraph);
        match self.table_depth {
            0 => self.body.push(paragraph),
            1 => self.cell_paragraphs.push(paragraph),
            // nested tables are not part of the outer cell text
            _ => {}
        }
    }

    fn into_text(self) -> String {
        let mut text = self.body.join("\n");
        for cell in self.cells {
            text.push('\n');
            text.push_str(&cell);
        }
        text
    }
}

fn docx_body_text(xml: &str) -> Result<String, ExtractError> {
    let token_re = Regex::new(r"<(/?)([A-Za-z0-9_:.\-]+)[^>]*?(/?)>|([^<]+)")?;
    let entity_re = Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|[a-z]+);")?;
    let mut state = DocxText::default();

    for token in token_re.captures_iter(xml) {
        if let Some(text) = token.get(4) {
            if state.in_text {
                state
                    .paragraph
                    .push_str(&decode_entities(&entity_re, text.as_str()));
            }
            continue;
        }

        let closing = token.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = token.get(3).is_some_and(|m| !m.as_str().is_empty());
        let name = token.get(2).map(|m| m.as_str()).unwrap_or_default();

        match (name, closing) {
            ("w:t", false) => state.in_text = !self_closing,
            ("w:t", true) => state.in_text = false,
            ("w:r", false) => state.in_run = !self_closing,
            ("w:r", true) => state.in_run = false,
            ("w:tab", false) if state.in_run => state.paragraph.push('\t'),
            ("w:br" | "w:cr", false) if state.in_run => state.paragraph.push('\n'),
            ("w:p", false) if self_closing => state.end_paragraph(),
            ("w:p", true) => state.end_paragraph(),
            ("w:tbl", false) => state.table_depth += 1,
            ("w:tbl", true) => state.table_depth = state.table_depth.saturating_sub(1),
            ("w:tc", false) if state.table_depth == 1 => state.cell_paragraphs.clear(),
            ("w:tc", true) if state.table_depth == 1 => {
                let cell = std::mem::take(&mut state.cell_paragraphs).join("\n");
                state.cells.push(cell);
            }
            _ => {}
        }
    }

    Ok(state.into_text())
}

fn decode_entities(entity_re: &Regex, text: &str) -> String {
    entity_re
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(Result::ok)
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
