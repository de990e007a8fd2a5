//! Document-understanding oracle: field extraction from PDFs and images.
//!
//! The capability is a two-call protocol (upload the document, then generate
//! against the uploaded handle) behind the [`DocumentOracle`] trait, so the
//! classification logic is testable without a network.

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;
pub use prompt::EXTRACTION_PROMPT;

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ExtractionFailure, OracleError};
use crate::models::RawFieldRecord;

/// Reference to a document previously uploaded to the oracle service.
#[derive(Debug, Clone)]
pub struct FileHandle {
    /// Service-assigned resource name (`files/...`).
    pub name: String,
    /// URI the generate call references the document by.
    pub uri: String,
    /// MIME type the document was uploaded as.
    pub mime_type: String,
}

/// A generative document-understanding service.
#[async_trait]
pub trait DocumentOracle: Send + Sync {
    /// Upload a document, returning a handle usable in [`generate`].
    ///
    /// [`generate`]: DocumentOracle::generate
    async fn upload(&self, path: &Path, mime_type: &str) -> Result<FileHandle, OracleError>;

    /// Run the prompt against an uploaded document.
    async fn generate(&self, prompt: &str, file: &FileHandle) -> Result<OracleResponse, OracleError>;
}

/// Raw answer from the oracle service.
///
/// Two documented shapes: the candidate list with parts, and a legacy
/// top-level `text`. Both are tolerated; classification probes them in that
/// order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,

    /// Legacy shape: the answer text directly on the response.
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,

    #[serde(default)]
    pub finish_reason: Option<String>,

    #[serde(default)]
    pub safety_ratings: Option<Vec<SafetyRating>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyRating {
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub probability: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Upload a document and extract invoice fields from it.
pub async fn extract_from_document(
    oracle: &dyn DocumentOracle,
    path: &Path,
    mime_type: &str,
) -> Result<RawFieldRecord, ExtractionFailure> {
    let handle = oracle.upload(path, mime_type).await?;
    debug!(file = %handle.name, "document uploaded to oracle");

    let response = oracle.generate(EXTRACTION_PROMPT, &handle).await?;
    classify_response(response)
}

/// Turn a raw oracle answer into a record or a typed failure.
///
/// The JSON parse is attempted before any blocked-status inspection: the
/// model sometimes produces valid data while still attaching a non-terminal
/// safety flag, and that data wins.
pub fn classify_response(response: OracleResponse) -> Result<RawFieldRecord, ExtractionFailure> {
    if let Some(text) = response_text(&response) {
        let cleaned = strip_json_fences(&text);
        if !cleaned.is_empty() {
            match serde_json::from_str::<RawFieldRecord>(cleaned) {
                Ok(record) => return Ok(record),
                Err(e) => warn!(error = %e, "oracle text did not parse as a field record"),
            }
        }
    }

    let candidate = response
        .candidates
        .as_ref()
        .and_then(|c| c.first());

    if let Some(candidate) = candidate {
        let finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        if finish_reason != "STOP" {
            let safety = candidate
                .safety_ratings
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|r| {
                    format!(
                        "{}={}",
                        r.category.as_deref().unwrap_or("?"),
                        r.probability.as_deref().unwrap_or("?")
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ExtractionFailure::OracleRefused(format!(
                "content blocked or incomplete (reason: {finish_reason}, safety: [{safety}])"
            )));
        }
    } else if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(ExtractionFailure::OracleRefused(format!(
            "prompt blocked (reason: {reason})"
        )));
    }

    Err(ExtractionFailure::OracleMalformedOutput(
        "response text was empty or not valid JSON".to_string(),
    ))
}

fn response_text(response: &OracleResponse) -> Option<String> {
    let from_candidates = response
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.as_ref())
        .and_then(|p| p.first())
        .and_then(|p| p.text.clone());

    from_candidates
        .or_else(|| response.text.clone())
        .filter(|t| !t.trim().is_empty())
}

/// Remove markdown code-fence markers the model adds despite instructions.
fn strip_json_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn response_from(value: serde_json::Value) -> OracleResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_plain_json_answer_parses() {
        let response = response_from(json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"invoice_number\": \"FT-1\", \"grand_total\": 120.0}"}]},
                "finishReason": "STOP"
            }]
        }));

        let record = classify_response(response).unwrap();
        assert_eq!(record.invoice_number.as_deref(), Some("FT-1"));
        assert_eq!(record.grand_total, Some(json!(120.0)));
    }

    #[test]
    fn test_fenced_json_with_safety_flag_still_succeeds() {
        let text = "```json\n{\"invoice_number\": \"FT-2\", \"tax_rate\": 20}\n```";
        let response = response_from(json!({
            "candidates": [{
                "content": {"parts": [{"text": text}]},
                "finishReason": "STOP",
                "safetyRatings": [
                    {"category": "HARM_CATEGORY_DANGEROUS_CONTENT", "probability": "LOW"}
                ]
            }]
        }));

        let record = classify_response(response).unwrap();
        assert_eq!(record.invoice_number.as_deref(), Some("FT-2"));
    }

    #[test]
    fn test_legacy_top_level_text_shape() {
        let response = response_from(json!({
            "text": "{\"invoice_number\": \"FT-3\"}"
        }));

        let record = classify_response(response).unwrap();
        assert_eq!(record.invoice_number.as_deref(), Some("FT-3"));
    }

    #[test]
    fn test_non_stop_finish_reason_is_refusal() {
        let response = response_from(json!({
            "candidates": [{
                "finishReason": "SAFETY",
                "safetyRatings": [
                    {"category": "HARM_CATEGORY_HARASSMENT", "probability": "HIGH"}
                ]
            }]
        }));

        let err = classify_response(response).unwrap_err();
        match err {
            ExtractionFailure::OracleRefused(msg) => {
                assert!(msg.contains("SAFETY"));
                assert!(msg.contains("HARM_CATEGORY_HARASSMENT"));
            }
            other => panic!("expected refusal, got {other:?}"),
        }
    }

    #[test]
    fn test_prompt_feedback_block_is_refusal() {
        let response = response_from(json!({
            "promptFeedback": {"blockReason": "PROHIBITED_CONTENT"}
        }));

        let err = classify_response(response).unwrap_err();
        assert!(matches!(err, ExtractionFailure::OracleRefused(_)));
    }

    #[test]
    fn test_unparseable_stop_answer_is_malformed_output() {
        let response = response_from(json!({
            "candidates": [{
                "content": {"parts": [{"text": "I could not read this document."}]},
                "finishReason": "STOP"
            }]
        }));

        let err = classify_response(response).unwrap_err();
        assert!(matches!(err, ExtractionFailure::OracleMalformedOutput(_)));
    }

    #[test]
    fn test_empty_response_is_malformed_output() {
        let err = classify_response(OracleResponse::default()).unwrap_err();
        assert!(matches!(err, ExtractionFailure::OracleMalformedOutput(_)));
    }

    #[test]
    fn test_fence_stripping() {
        assert_eq!(strip_json_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_json_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_json_fences("  {} "), "{}");
    }
}
