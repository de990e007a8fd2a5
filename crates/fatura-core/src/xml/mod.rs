//! Structured invoice extraction from UBL XML documents.

pub mod ubl;

pub use ubl::extract_ubl_invoice;
