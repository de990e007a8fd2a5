//! Gemini implementation of the document oracle.
//!
//! Two REST calls: the media upload endpoint (`upload/v1beta/files`, raw
//! protocol) to register the document, then `models/{model}:generateContent`
//! referencing it through a `file_data` part. Authentication is the `?key=`
//! query parameter.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DocumentOracle, FileHandle, OracleResponse};
use crate::error::OracleError;
use crate::models::OracleConfig;

/// Temperature for extraction runs. Low for reproducible structured output.
/// f64 so the serialized value is exactly 0.1.
const GENERATION_TEMPERATURE: f64 = 0.1;

/// HTTP client for the Gemini generative language API.
///
/// The API key is resolved lazily so that pipelines which never touch the
/// oracle (pure XML runs) work without one.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text {
        text: String,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: UploadedFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedFile {
    name: String,
    uri: String,
    #[serde(default)]
    mime_type: Option<String>,
}

impl GeminiClient {
    /// Build a client from configuration.
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.resolve_api_key(),
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn key(&self) -> Result<&str, OracleError> {
        self.api_key.as_deref().ok_or_else(|| {
            OracleError::Config("no API key configured and GEMINI_API_KEY is not set".to_string())
        })
    }
}

#[async_trait]
impl DocumentOracle for GeminiClient {
    async fn upload(&self, path: &Path, mime_type: &str) -> Result<FileHandle, OracleError> {
        let key = self.key()?;
        let bytes = std::fs::read(path)
            .map_err(|e| OracleError::Transport(format!("reading {}: {e}", path.display())))?;

        let url = format!("{}/upload/v1beta/files?key={}", self.endpoint, key);
        debug!(size = bytes.len(), mime = mime_type, "uploading document");

        let response = self
            .http
            .post(&url)
            .header("X-Goog-Upload-Protocol", "raw")
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| OracleError::Transport(format!("upload request: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Api(format!("upload failed ({status}): {body}")));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Api(format!("upload response: {e}")))?;

        Ok(FileHandle {
            name: uploaded.file.name,
            uri: uploaded.file.uri,
            mime_type: uploaded
                .file
                .mime_type
                .unwrap_or_else(|| mime_type.to_string()),
        })
    }

    async fn generate(
        &self,
        prompt: &str,
        file: &FileHandle,
    ) -> Result<OracleResponse, OracleError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Text {
                        text: prompt.to_string(),
                    },
                    RequestPart::FileData {
                        file_data: FileData {
                            mime_type: file.mime_type.clone(),
                            file_uri: file.uri.clone(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: GENERATION_TEMPERATURE,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint,
            self.model,
            self.key()?
        );

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Transport(format!("generate request: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Api(format!(
                "generate failed ({status}): {body}"
            )));
        }

        response
            .json::<OracleResponse>()
            .await
            .map_err(|e| OracleError::Api(format!("generate response: {e}")))
    }
}
