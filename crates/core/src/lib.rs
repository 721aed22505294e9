pub mod error;
pub mod extractor;
pub mod ingest;
pub mod models;
pub mod normalizer;
pub mod ranker;
pub mod stopwords;

pub use error::{ExtractError, IngestError, KeywordError};
pub use extractor::{
    detect_format, extract_document, extract_text, DocxExtractor, LopdfExtractor,
    PlainTextExtractor, TextExtractor,
};
pub use ingest::{
    digest_file, discover_documents, parse_discovered, parse_document, parse_folder_best_effort,
    IngestionReport, SkippedDocument, EMPTY_TEXT_MESSAGE, UNSUPPORTED_MESSAGE,
};
pub use models::{
    DocumentFingerprint, DocumentFormat, ExtractionResult, KeywordConfig, KeywordList,
    ParseReport, ParseStatus, RankStatus, TermWeight, DEFAULT_MAX_VOCABULARY, DEFAULT_TOP_N,
    NGRAM_RANGE,
};
pub use normalizer::{Normalizer, Vocabulary, TOKEN_PATTERN};
pub use ranker::{rank, select_top, term_weights, KeywordRanker};
pub use stopwords::{StopwordFilter, ENGLISH_STOP_WORDS};
