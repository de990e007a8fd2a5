//! Document processing pipeline: type detection, extractor dispatch, and
//! failure containment.
//!
//! [`Pipeline::process`] always yields a [`ProcessingResult`]; extraction
//! problems become `failed`, anything unexpected becomes `error`, and the
//! result is persisted in every branch.

use std::path::Path;

use tracing::{info, warn};

use crate::error::{ExtractionFailure, FaturaError};
use crate::models::{FaturaConfig, ProcessingResult, RawFieldRecord, SourceType};
use crate::oracle::{self, DocumentOracle};
use crate::store::ResultStore;
use crate::validate::validate_record;
use crate::xml::extract_ubl_invoice;

/// Image formats routed to the oracle.
const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp", "heic"];

/// Classify a document by MIME type, falling back to the file extension.
pub fn detect_source_type(path: &Path) -> SourceType {
    if let Some(mime) = mime_guess::from_path(path).first() {
        match (mime.type_().as_str(), mime.subtype().as_str()) {
            ("application" | "text", "xml") => return SourceType::Xml,
            ("application", "pdf") => return SourceType::Pdf,
            ("image", _) => return SourceType::Image,
            _ => {}
        }
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());
    match ext.as_deref() {
        Some("xml") => SourceType::Xml,
        Some("pdf") => SourceType::Pdf,
        Some(e) if IMAGE_EXTENSIONS.contains(&e) => SourceType::Image,
        _ => SourceType::Unsupported,
    }
}

/// MIME type to upload a document as.
fn mime_type_for(path: &Path, source_type: SourceType) -> String {
    if let Some(mime) = mime_guess::from_path(path).first() {
        return mime.to_string();
    }
    match source_type {
        SourceType::Pdf => "application/pdf".to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

/// Single-document extraction pipeline.
pub struct Pipeline<O> {
    oracle: O,
    store: ResultStore,
}

impl<O: DocumentOracle> Pipeline<O> {
    pub fn new(config: &FaturaConfig, oracle: O) -> Self {
        Self {
            oracle,
            store: ResultStore::new(&config.storage.upload_dir),
        }
    }

    /// Process one document end to end.
    ///
    /// This is the containment boundary: every outcome, including internal
    /// errors, becomes a persisted [`ProcessingResult`].
    pub async fn process(&self, path: &Path) -> ProcessingResult {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let source_type = detect_source_type(path);
        info!(file = %filename, source_type = source_type.as_str(), "processing document");

        let result = match self.run_extraction(path, source_type).await {
            Ok(raw) => {
                let validated = validate_record(raw);
                ProcessingResult::completed(&filename, source_type, validated)
            }
            Err(FaturaError::Extraction(failure)) => {
                warn!(file = %filename, reason = %failure, "extraction failed");
                ProcessingResult::failed(&filename, source_type, failure.to_string())
            }
            Err(other) => {
                warn!(file = %filename, error = %other, "unexpected processing error");
                ProcessingResult::internal_error(&filename, source_type, other.to_string())
            }
        };

        // A failed persist of a finished record is logged, not fatal.
        if let Err(e) = self.store.save(&result.filename, &result) {
            warn!(file = %result.filename, error = %e, "could not persist result");
        }

        result
    }

    /// Access the pipeline's result store.
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    async fn run_extraction(
        &self,
        path: &Path,
        source_type: SourceType,
    ) -> crate::error::Result<RawFieldRecord> {
        match source_type {
            SourceType::Xml => {
                let content = std::fs::read_to_string(path)?;
                Ok(extract_ubl_invoice(&content)?)
            }
            SourceType::Pdf | SourceType::Image => {
                let mime = mime_type_for(path, source_type);
                Ok(oracle::extract_from_document(&self.oracle, path, &mime).await?)
            }
            SourceType::Unsupported | SourceType::Unknown => {
                Err(ExtractionFailure::UnsupportedType.into())
            }
        }
    }
}
