//! Invoice field records as they move through the pipeline.
//!
//! A [`RawFieldRecord`] is produced by exactly one extractor (UBL or oracle),
//! consumed once by the validator, and replaced by a [`ValidatedRecord`].
//! The [`ProcessingResult`] wraps the outcome and is what gets persisted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unvalidated output of an extractor.
///
/// Amount-like fields are kept as raw JSON values because an extractor may
/// yield either a number or a formatted string; coercion is the normalizer's
/// job. Unknown keys in oracle output are dropped on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFieldRecord {
    /// Invoice number as printed on the document.
    #[serde(default)]
    pub invoice_number: Option<String>,

    /// Issue date, format unconstrained at this stage.
    #[serde(default)]
    pub issue_date: Option<String>,

    /// Seller tax ID (10-digit corporate or 11-digit individual).
    #[serde(default)]
    pub seller_tax_id: Option<String>,

    /// Seller display name.
    #[serde(default)]
    pub seller_name: Option<String>,

    /// Buyer tax ID, optional on many documents.
    #[serde(default)]
    pub buyer_tax_id: Option<String>,

    /// Buyer display name.
    #[serde(default)]
    pub buyer_name: Option<String>,

    /// Amount subject to tax, before tax.
    #[serde(default)]
    pub tax_base: Option<Value>,

    /// Dominant tax rate in percent; null when rates are mixed or unknown.
    #[serde(default)]
    pub tax_rate: Option<Value>,

    /// Total tax amount.
    #[serde(default)]
    pub tax_amount: Option<Value>,

    /// Final payable total, taxes included.
    #[serde(default)]
    pub grand_total: Option<Value>,

    /// Per-rate breakdown, populated by the XML extractor only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tax_breakdown: Vec<TaxBreakdownEntry>,
}

/// One (rate, base, amount) triple for a distinct tax rate on the invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxBreakdownEntry {
    /// Rate in percent.
    pub rate: Option<f64>,

    /// Taxable amount at this rate.
    pub base: Option<f64>,

    /// Tax amount at this rate.
    pub amount: Option<f64>,
}

/// Normalized record with validation findings.
///
/// Every field that was present in the raw record went through exactly one
/// normalizer; a failed normalization nulls the field and leaves an entry in
/// `validation_errors` or `validation_warnings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatedRecord {
    pub invoice_number: Option<String>,

    /// Canonical `DD.MM.YYYY`, or null when the raw date failed validation.
    pub issue_date: Option<String>,

    /// Digit-only seller tax ID.
    pub seller_tax_id: Option<String>,

    pub seller_name: Option<String>,

    /// Digit-only buyer tax ID; format issues here are warnings, not errors.
    pub buyer_tax_id: Option<String>,

    pub buyer_name: Option<String>,

    pub tax_base: Option<f64>,

    pub tax_rate: Option<f64>,

    pub tax_amount: Option<f64>,

    pub grand_total: Option<f64>,

    /// Carried through from extraction untouched; authoritative for
    /// multi-rate invoices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tax_breakdown: Vec<TaxBreakdownEntry>,

    /// Blocking issues; an affected field is unusable.
    #[serde(default)]
    pub validation_errors: Vec<String>,

    /// Non-blocking issues surfaced for human review.
    #[serde(default)]
    pub validation_warnings: Vec<String>,
}

/// Detected document type that drove extractor routing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// UBL XML invoice.
    Xml,
    /// PDF document.
    Pdf,
    /// Scanned image.
    Image,
    /// Recognized but unprocessable type.
    Unsupported,
    /// Type detection never ran.
    #[default]
    Unknown,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Xml => "xml",
            SourceType::Pdf => "pdf",
            SourceType::Image => "image",
            SourceType::Unsupported => "unsupported",
            SourceType::Unknown => "unknown",
        }
    }
}

/// Terminal status of one document-processing invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Extraction and validation ran to completion.
    Completed,
    /// The extractor could not produce a record.
    Failed,
    /// An unexpected internal error was contained at the pipeline boundary.
    Error,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
            ProcessingStatus::Error => "error",
        }
    }
}

/// Top-level persisted unit, one per processed document.
///
/// Never mutated after creation; reprocessing the same filename overwrites
/// the stored record (last write wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub status: ProcessingStatus,

    pub source_type: SourceType,

    /// Original filename the record is keyed under.
    pub filename: String,

    /// The validated record; null unless status is `completed`.
    pub extracted_data: Option<ValidatedRecord>,

    /// Human-readable failure reason; null on success.
    pub error: Option<String>,
}

impl ProcessingResult {
    /// Build a completed result around a validated record.
    pub fn completed(
        filename: impl Into<String>,
        source_type: SourceType,
        data: ValidatedRecord,
    ) -> Self {
        Self {
            status: ProcessingStatus::Completed,
            source_type,
            filename: filename.into(),
            extracted_data: Some(data),
            error: None,
        }
    }

    /// Build a failed result with a reason.
    pub fn failed(
        filename: impl Into<String>,
        source_type: SourceType,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            status: ProcessingStatus::Failed,
            source_type,
            filename: filename.into(),
            extracted_data: None,
            error: Some(reason.into()),
        }
    }

    /// Build an error result for a contained internal failure.
    pub fn internal_error(
        filename: impl Into<String>,
        source_type: SourceType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status: ProcessingStatus::Error,
            source_type,
            filename: filename.into(),
            extracted_data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn raw_record_deserializes_from_oracle_json() {
        let json = r#"{
            "invoice_number": "FAT202412345",
            "issue_date": "21.07.2024",
            "seller_tax_id": "1234567890",
            "seller_name": "SELLER CORP",
            "buyer_tax_id": null,
            "buyer_name": null,
            "tax_base": 2500.50,
            "tax_rate": 20,
            "tax_amount": "500,10",
            "grand_total": 3000.60,
            "unexpected_key": "ignored"
        }"#;

        let record: RawFieldRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.invoice_number.as_deref(), Some("FAT202412345"));
        assert_eq!(record.buyer_tax_id, None);
        assert!(record.tax_base.is_some());
        assert!(record.tax_breakdown.is_empty());
    }

    #[test]
    fn processing_result_serializes_with_contract_keys() {
        let result = ProcessingResult::failed("scan.pdf", SourceType::Pdf, "oracle refused");
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["status"], "failed");
        assert_eq!(value["source_type"], "pdf");
        assert_eq!(value["filename"], "scan.pdf");
        assert!(value["extracted_data"].is_null());
        assert_eq!(value["error"], "oracle refused");
    }
}
