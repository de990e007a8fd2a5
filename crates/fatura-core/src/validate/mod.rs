//! Field normalization and cross-field validation.
//!
//! [`validate_record`] never fails: every finding lands in the record's
//! `validation_errors` (blocking) or `validation_warnings` (advisory) list
//! and the affected field is normalized or left as delivered.

pub mod amount;
pub mod date;
pub mod tax_id;

pub use amount::normalize_amount;
pub use date::normalize_date;
pub use tax_id::normalize_tax_id;

use tracing::debug;

use crate::models::{RawFieldRecord, ValidatedRecord};

/// Relative tolerance for arithmetic reconciliation, 1%. A one-unit gap on
/// a four-digit total is inside this bound and does not warn.
const REL_TOL: f64 = 1e-2;

/// Absolute tolerance, two kuruş. Covers rounding on small invoices where
/// the relative bound is tighter than the currency's resolution.
const ABS_TOL: f64 = 0.02;

/// `math.isclose`-style comparison with both tolerances.
fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= f64::max(REL_TOL * f64::max(a.abs(), b.abs()), ABS_TOL)
}

/// Normalize every field of a raw record and run cross-field checks.
///
/// Date, seller tax ID, and amount failures are blocking errors; the buyer
/// tax ID is optional so its failures are warnings; a bad tax rate is
/// silently nulled. Arithmetic mismatches are warnings only.
pub fn validate_record(raw: RawFieldRecord) -> ValidatedRecord {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let issue_date = match raw.issue_date.as_deref() {
        Some(s) => match normalize_date(s) {
            Ok(d) => Some(d),
            Err(e) => {
                errors.push(format!("Issue date: {e}"));
                None
            }
        },
        None => {
            errors.push("Issue date: value is empty or has the wrong type".to_string());
            None
        }
    };

    let seller_tax_id = match raw.seller_tax_id.as_deref() {
        Some(s) => match normalize_tax_id(s) {
            Ok(id) => Some(id),
            Err(e) => {
                errors.push(format!("Seller tax ID: {e}"));
                raw.seller_tax_id.clone()
            }
        },
        None => {
            errors.push("Seller tax ID: value is empty or has the wrong type".to_string());
            None
        }
    };

    // Buyer identification is optional on many document kinds.
    let buyer_tax_id = match raw.buyer_tax_id.as_deref() {
        Some(s) => match normalize_tax_id(s) {
            Ok(id) => Some(id),
            Err(e) => {
                warnings.push(format!("Buyer tax ID: {e}"));
                raw.buyer_tax_id.clone()
            }
        },
        None => None,
    };

    let tax_base = match normalize_amount(raw.tax_base.as_ref()) {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(format!("Tax base: {e}"));
            None
        }
    };

    let tax_amount = match normalize_amount(raw.tax_amount.as_ref()) {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(format!("Tax amount: {e}"));
            None
        }
    };

    let grand_total = match normalize_amount(raw.grand_total.as_ref()) {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(format!("Grand total: {e}"));
            None
        }
    };

    // Rate is advisory only; a bad value is dropped without a finding.
    let tax_rate = normalize_amount(raw.tax_rate.as_ref()).ok();

    if let (Some(base), Some(tax), Some(total)) = (tax_base, tax_amount, grand_total) {
        let calculated_total = base + tax;
        if !approx_eq(calculated_total, total) {
            warnings.push(format!(
                "Arithmetic mismatch: tax base ({base:.2}) + tax ({tax:.2}) = \
                 {calculated_total:.2} != grand total ({total:.2})"
            ));
        }

        if let Some(rate) = tax_rate {
            if rate > 0.0 && base != 0.0 {
                let calculated_tax = base * (rate / 100.0);
                if !approx_eq(calculated_tax, tax) {
                    warnings.push(format!(
                        "Tax amount mismatch: tax base * rate ({base:.2} * {rate}%) = \
                         {calculated_tax:.2} != tax amount ({tax:.2})"
                    ));
                }
            }
        }
    }

    debug!(
        errors = errors.len(),
        warnings = warnings.len(),
        "validation finished"
    );

    ValidatedRecord {
        invoice_number: raw.invoice_number,
        issue_date,
        seller_tax_id,
        seller_name: raw.seller_name,
        buyer_tax_id,
        buyer_name: raw.buyer_name,
        tax_base,
        tax_rate,
        tax_amount,
        grand_total,
        tax_breakdown: raw.tax_breakdown,
        validation_errors: errors,
        validation_warnings: warnings,
    }
}
