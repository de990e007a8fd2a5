//! The fixed extraction instruction sent with every document.

/// Field-by-field JSON extraction prompt.
///
/// Keys mirror [`crate::models::RawFieldRecord`] so the answer deserializes
/// directly. The model does not always honor the "JSON only" rule, so fence
/// markers are still stripped on parse.
pub const EXTRACTION_PROMPT: &str = r#"TASK: Carefully analyze the provided invoice document (PDF or image).
OUTPUT FORMAT: Extract the fields listed below and respond with *only* a valid JSON object. Do NOT add any text outside the JSON (no explanations, prefaces, or conclusions).

REQUESTED FIELDS (JSON keys and descriptions):
- "invoice_number": The unique number printed on the invoice (serial and sequence may be combined, e.g. "ABC20240000123"). null if not found.
- "issue_date": The date the invoice was issued (format: "DD.MM.YYYY"). null if not found.
- "seller_tax_id": The seller's tax identification number (10-digit VKN) or national ID (11-digit TCKN). Digits only. null if not found.
- "seller_name": The seller's full trade name or personal name. null if not found.
- "buyer_tax_id": The buyer's VKN or TCKN, if present. Digits only. null if not found or unreadable.
- "buyer_name": The buyer's full name, if present. null if not found or unreadable.
- "tax_base": The sum of amounts the tax is calculated from (subtotal excluding tax). Numeric (float). null if not found.
- "tax_rate": The dominant or main tax rate (%). Numeric only (e.g. 20, 10, 1, 0). null when several different rates apply or it cannot be determined.
- "tax_amount": The total calculated tax amount. Numeric (float). null if not found.
- "grand_total": The final payable total including all taxes. Numeric (float). null if not found.

RULES:
1. The response must be JSON only. Do NOT use markers such as ```json ... ```.
2. When a value is not found or unreadable, the key's value must be null.
3. The date must be in "DD.MM.YYYY" format. Convert it if found in another format.
4. Tax ID fields must contain digits only.
5. Numeric fields must be floats with a dot (.) as the decimal separator. Do NOT use thousands separators.
6. Do NOT append currency symbols (TL, $, EUR etc.) to numeric values.

EXAMPLE OF VALID JSON OUTPUT:
{
  "invoice_number": "FAT202412345",
  "issue_date": "21.07.2024",
  "seller_tax_id": "1234567890",
  "seller_name": "SELLER CORPORATION",
  "buyer_tax_id": "09876543210",
  "buyer_name": "BUYER LIMITED",
  "tax_base": 2500.50,
  "tax_rate": 20,
  "tax_amount": 500.10,
  "grand_total": 3000.60
}
"#;
