//! Spreadsheet export of completed processing results.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::error::{ExportError, Result};
use crate::models::{ProcessingResult, ProcessingStatus};

const HEADERS: [&str; 12] = [
    "Invoice No",
    "Date",
    "Seller Tax ID",
    "Seller Name",
    "Buyer Tax ID",
    "Buyer Name",
    "Tax Base",
    "Tax Rate (%)",
    "Tax Amount",
    "Grand Total",
    "Validation Errors",
    "Validation Warnings",
];

/// Write a completed result to `<stem>.xlsx` under `output_dir`.
///
/// Only `completed` results carry extracted data; anything else is refused
/// with a typed error so callers can surface the status to the user.
pub fn export_to_xlsx(result: &ProcessingResult, output_dir: &Path) -> Result<PathBuf> {
    if result.status != ProcessingStatus::Completed {
        return Err(ExportError::NotCompleted {
            filename: result.filename.clone(),
            status: result.status.as_str().to_string(),
        }
        .into());
    }
    let data = result.extracted_data.as_ref().ok_or_else(|| {
        ExportError::NotCompleted {
            filename: result.filename.clone(),
            status: result.status.as_str().to_string(),
        }
    })?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Invoice")?;

    let header_format = Format::new().set_bold();
    let amount_format = Format::new().set_num_format("#,##0.00");

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    let text_cells = [
        data.invoice_number.as_deref(),
        data.issue_date.as_deref(),
        data.seller_tax_id.as_deref(),
        data.seller_name.as_deref(),
        data.buyer_tax_id.as_deref(),
        data.buyer_name.as_deref(),
    ];
    for (col, value) in text_cells.iter().enumerate() {
        worksheet.write_string(1, col as u16, value.unwrap_or(""))?;
    }

    let amount_cells = [data.tax_base, data.tax_rate, data.tax_amount, data.grand_total];
    for (offset, value) in amount_cells.iter().enumerate() {
        let col = (6 + offset) as u16;
        if let Some(v) = value {
            worksheet.write_number_with_format(1, col, *v, &amount_format)?;
        }
    }

    worksheet.write_string(1, 10, data.validation_errors.join(", "))?;
    worksheet.write_string(1, 11, data.validation_warnings.join(", "))?;

    std::fs::create_dir_all(output_dir)?;
    let stem = Path::new(&result.filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| result.filename.clone());
    let path = output_dir.join(format!("{stem}.xlsx"));
    workbook.save(&path)?;

    info!(path = %path.display(), "spreadsheet written");
    Ok(path)
}
