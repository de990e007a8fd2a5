//! Error types for the fatura-core library.

use thiserror::Error;

/// Main error type for the fatura library.
#[derive(Error, Debug)]
pub enum FaturaError {
    /// A document could not be extracted.
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionFailure),

    /// Export was refused or could not be written.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Spreadsheet serialization error.
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Why an extractor could not produce a raw field record.
///
/// This taxonomy is flattened to a message string only when a
/// [`crate::models::ProcessingResult`] is built; internal callers can still
/// branch on the kind.
#[derive(Error, Debug)]
pub enum ExtractionFailure {
    /// The file type is not XML, PDF, or a recognized image format.
    #[error("unsupported file type")]
    UnsupportedType,

    /// The structured document is malformed or missing required fields.
    #[error("document could not be parsed: {0}")]
    ParseFailure(String),

    /// The oracle client could not be configured (e.g. missing API key).
    #[error("oracle configuration error: {0}")]
    OracleConfig(String),

    /// The file could not be uploaded or the oracle could not be reached.
    #[error("oracle transport error: {0}")]
    OracleTransport(String),

    /// The oracle declined to answer (safety/policy block).
    #[error("oracle refused the document: {0}")]
    OracleRefused(String),

    /// The oracle answered, but not in the expected structured shape.
    #[error("oracle output was not parseable: {0}")]
    OracleMalformedOutput(String),
}

impl From<OracleError> for ExtractionFailure {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Config(msg) => ExtractionFailure::OracleConfig(msg),
            OracleError::Transport(msg) => ExtractionFailure::OracleTransport(msg),
            OracleError::Api(msg) => ExtractionFailure::OracleTransport(msg),
        }
    }
}

/// Errors raised by a [`crate::oracle::DocumentOracle`] implementation.
#[derive(Error, Debug)]
pub enum OracleError {
    /// Client-side configuration problem.
    #[error("configuration: {0}")]
    Config(String),

    /// Network or file-system failure before a response was obtained.
    #[error("transport: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("API error: {0}")]
    Api(String),
}

/// Errors related to spreadsheet export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Only completed records may be exported.
    #[error("record '{filename}' has status '{status}' and cannot be exported")]
    NotCompleted { filename: String, status: String },

    /// No stored result exists for the filename.
    #[error("no stored result for '{0}'")]
    NotFound(String),
}

/// Why a single field value failed normalization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// The field is empty or not textual.
    #[error("value is empty or has the wrong type")]
    MissingOrWrongType,

    /// The value does not match the expected layout.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A tax ID with the wrong digit count.
    #[error("invalid length ({digits} digits): {value}")]
    InvalidLength { digits: usize, value: String },

    /// The amount is absent.
    #[error("value is missing")]
    Missing,

    /// The amount is neither a number nor a string.
    #[error("invalid type: {0}")]
    InvalidType(String),
}

/// Result type for the fatura library.
pub type Result<T> = std::result::Result<T, FaturaError>;
