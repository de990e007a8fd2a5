//! Keyed JSON persistence for processing results.
//!
//! One file per processed document, keyed by the source filename's stem.
//! Reprocessing the same filename overwrites the previous result.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::models::ProcessingResult;

/// Stores one pretty-printed JSON file per processed document.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path the result for `filename` is stored at.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        let stem = Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.to_string());
        self.dir.join(format!("{stem}.json"))
    }

    /// Persist a result, replacing any previous one for the same filename.
    pub fn save(&self, filename: &str, result: &ProcessingResult) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(filename);
        let content = serde_json::to_string_pretty(result)?;
        std::fs::write(&path, content)?;
        debug!(path = %path.display(), "result persisted");
        Ok(path)
    }

    /// Read a stored result back; `Ok(None)` when nothing is stored.
    pub fn load(&self, filename: &str) -> Result<Option<ProcessingResult>> {
        let path = self.path_for(filename);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let result = serde_json::from_str(&content)?;
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProcessingResult, SourceType, ValidatedRecord};
    use pretty_assertions::assert_eq;

    fn sample_result(number: &str) -> ProcessingResult {
        let record = ValidatedRecord {
            invoice_number: Some(number.to_string()),
            ..ValidatedRecord::default()
        };
        ProcessingResult::completed("invoice.xml", SourceType::Xml, record)
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());

        store.save("invoice.xml", &sample_result("FT-1")).unwrap();
        let loaded = store.load("invoice.xml").unwrap().unwrap();

        assert_eq!(
            loaded.extracted_data.unwrap().invoice_number.as_deref(),
            Some("FT-1")
        );
    }

    #[test]
    fn test_same_filename_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());

        store.save("invoice.xml", &sample_result("FT-1")).unwrap();
        store.save("invoice.xml", &sample_result("FT-2")).unwrap();

        let loaded = store.load("invoice.xml").unwrap().unwrap();
        assert_eq!(
            loaded.extracted_data.unwrap().invoice_number.as_deref(),
            Some("FT-2")
        );

        // one file, keyed by stem
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_extension_is_replaced_in_key() {
        let store = ResultStore::new("/tmp/results");
        assert_eq!(
            store.path_for("scan.pdf"),
            PathBuf::from("/tmp/results/scan.json")
        );
    }

    #[test]
    fn test_missing_result_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());
        assert!(store.load("nothing.pdf").unwrap().is_none());
    }
}
