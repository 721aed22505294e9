use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum KeywordError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("regex error: {0}")]
    RegexError(#[from] regex::Error),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("docx parse error: {0}")]
    Docx(String),

    #[error("regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Legacy .doc format is not supported. Please convert to .docx or PDF")]
    LegacyFormat,

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Keyword(#[from] KeywordError),
}
