//! Data models for extracted invoice records and pipeline results.

pub mod config;
pub mod record;

pub use config::{FaturaConfig, OracleConfig, StorageConfig};
pub use record::{
    ProcessingResult, ProcessingStatus, RawFieldRecord, SourceType, TaxBreakdownEntry,
    ValidatedRecord,
};
