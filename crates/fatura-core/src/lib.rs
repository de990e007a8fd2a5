//! Core library for Turkish invoice data extraction.
//!
//! This crate provides:
//! - UBL XML invoice parsing (e-fatura documents)
//! - AI document understanding for PDFs and scanned images
//! - Field normalization and cross-field validation
//! - JSON result persistence and xlsx export

pub mod error;
pub mod export;
pub mod models;
pub mod oracle;
pub mod pipeline;
pub mod store;
pub mod validate;
pub mod xml;

pub use error::{ExportError, ExtractionFailure, FaturaError, NormalizeError, OracleError, Result};
pub use export::export_to_xlsx;
pub use models::{
    FaturaConfig, ProcessingResult, ProcessingStatus, RawFieldRecord, SourceType, ValidatedRecord,
};
pub use oracle::{DocumentOracle, GeminiClient};
pub use pipeline::{Pipeline, detect_source_type};
pub use store::ResultStore;
pub use validate::validate_record;
