//! UBL-TR invoice parsing.
//!
//! A streaming walk over the document with an element-path stack. Elements
//! are matched by local name so both prefixed (`cbc:ID`) and unprefixed
//! documents resolve, regardless of which namespace revision declared them.

use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::ExtractionFailure;
use crate::models::{RawFieldRecord, TaxBreakdownEntry};

/// Parse a UBL invoice document into a raw field record.
///
/// Hard floor: the invoice number, issue date, and grand total must all be
/// present, otherwise the document is rejected with `ParseFailure`.
pub fn extract_ubl_invoice(xml: &str) -> Result<RawFieldRecord, ExtractionFailure> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedUbl::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.name().local_name().as_ref())
                    .unwrap_or("")
                    .to_string();

                // schemeID distinguishes VKN from TCKN party identifiers
                if name == "ID" {
                    for attr in e.attributes().flatten() {
                        let local = attr.key.local_name();
                        let key = std::str::from_utf8(local.as_ref()).unwrap_or("");
                        if key == "schemeID" {
                            let val = std::str::from_utf8(&attr.value).unwrap_or("");
                            parsed.current_scheme_id = Some(val.to_string());
                        }
                    }
                }

                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if !text.is_empty() {
                    parsed.handle_text(&path, &text);
                }
            }
            Ok(Event::End(_)) => {
                let ended = path.pop().unwrap_or_default();
                if ended == "TaxSubtotal" {
                    if let Some(entry) = parsed.current_subtotal.take() {
                        if parsed.primary_rate.is_none() {
                            parsed.primary_rate = entry.rate;
                        }
                        parsed.tax_breakdown.push(entry);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractionFailure::ParseFailure(format!(
                    "malformed XML: {e}"
                )));
            }
            _ => {}
        }
    }

    parsed.into_record()
}

#[derive(Default)]
struct ParsedUbl {
    invoice_number: Option<String>,
    issue_date: Option<String>,

    seller_vkn: Option<String>,
    seller_tckn: Option<String>,
    seller_name: Option<String>,
    seller_person_name: Option<String>,

    buyer_vkn: Option<String>,
    buyer_tckn: Option<String>,
    buyer_name: Option<String>,

    line_extension_amount: Option<String>,
    payable_amount: Option<String>,

    tax_amount_sum: f64,
    tax_breakdown: Vec<TaxBreakdownEntry>,
    current_subtotal: Option<TaxBreakdownEntry>,
    primary_rate: Option<f64>,

    current_scheme_id: Option<String>,
}

impl ParsedUbl {
    fn handle_text(&mut self, path: &[String], text: &str) {
        let leaf = path.last().map(|s| s.as_str()).unwrap_or("");
        let parent = if path.len() >= 2 {
            path[path.len() - 2].as_str()
        } else {
            ""
        };

        let in_seller = path.iter().any(|p| p == "AccountingSupplierParty");
        let in_buyer = path.iter().any(|p| p == "AccountingCustomerParty");
        let in_subtotal = path.iter().any(|p| p == "TaxSubtotal");
        let at_root_child = path.len() == 2;

        // Invoice-level fields
        if at_root_child {
            match leaf {
                "ID" => self.invoice_number = Some(text.to_string()),
                "IssueDate" => self.issue_date = Some(text.to_string()),
                _ => {}
            }
        }

        // Seller party
        if in_seller {
            match leaf {
                "ID" if parent == "PartyIdentification" => {
                    match self.current_scheme_id.take().as_deref() {
                        Some("VKN") => self.seller_vkn = Some(text.to_string()),
                        Some("TCKN") => self.seller_tckn = Some(text.to_string()),
                        _ => {}
                    }
                }
                "Name" if parent == "PartyName" => self.seller_name = Some(text.to_string()),
                "FirstName" if parent == "Person" => {
                    self.seller_person_name = Some(text.to_string());
                }
                _ => {}
            }
        }

        // Buyer party
        if in_buyer {
            match leaf {
                "ID" if parent == "PartyIdentification" => {
                    match self.current_scheme_id.take().as_deref() {
                        Some("VKN") => self.buyer_vkn = Some(text.to_string()),
                        Some("TCKN") => self.buyer_tckn = Some(text.to_string()),
                        _ => {}
                    }
                }
                "Name" if parent == "PartyName" => self.buyer_name = Some(text.to_string()),
                _ => {}
            }
        }

        // Monetary totals
        if parent == "LegalMonetaryTotal" {
            match leaf {
                "LineExtensionAmount" => self.line_extension_amount = Some(text.to_string()),
                "PayableAmount" => self.payable_amount = Some(text.to_string()),
                _ => {}
            }
        }

        // A document may carry several TaxTotal blocks; their direct
        // TaxAmount children sum to the total tax.
        if leaf == "TaxAmount" && parent == "TaxTotal" {
            match text.parse::<f64>() {
                Ok(v) => self.tax_amount_sum += v,
                Err(_) => warn!(value = text, "unparseable TaxTotal amount, skipped"),
            }
        }

        // Per-rate breakdown
        if in_subtotal {
            let entry = self.current_subtotal.get_or_insert_with(Default::default);
            match leaf {
                "TaxableAmount" if parent == "TaxSubtotal" => {
                    entry.base = parse_amount_opt(text, "TaxableAmount");
                }
                "TaxAmount" if parent == "TaxSubtotal" => {
                    entry.amount = parse_amount_opt(text, "TaxAmount");
                }
                "Percent" if parent == "TaxCategory" => {
                    entry.rate = parse_amount_opt(text, "Percent");
                }
                _ => {}
            }
        }
    }

    fn into_record(self) -> Result<RawFieldRecord, ExtractionFailure> {
        let issue_date = self.issue_date.map(|raw| reformat_issue_date(&raw));

        let tax_base = self
            .line_extension_amount
            .as_deref()
            .and_then(|s| parse_amount_opt(s, "LineExtensionAmount"));
        let grand_total = self
            .payable_amount
            .as_deref()
            .and_then(|s| parse_amount_opt(s, "PayableAmount"));

        if self.invoice_number.is_none() || issue_date.is_none() || grand_total.is_none() {
            return Err(ExtractionFailure::ParseFailure(
                "required fields missing (invoice number, issue date, grand total)".to_string(),
            ));
        }

        debug!(
            breakdown_entries = self.tax_breakdown.len(),
            "UBL document parsed"
        );

        Ok(RawFieldRecord {
            invoice_number: self.invoice_number,
            issue_date,
            seller_tax_id: self.seller_vkn.or(self.seller_tckn),
            seller_name: self.seller_name.or(self.seller_person_name),
            buyer_tax_id: self.buyer_vkn.or(self.buyer_tckn),
            buyer_name: self.buyer_name,
            tax_base: tax_base.map(|v| json!(v)),
            tax_rate: self.primary_rate.map(|v| json!(v)),
            tax_amount: Some(json!(self.tax_amount_sum)),
            grand_total: grand_total.map(|v| json!(v)),
            tax_breakdown: self.tax_breakdown,
        })
    }
}

/// `IssueDate` arrives as ISO `YYYY-MM-DD`; reformat to `DD.MM.YYYY`.
/// An unexpected layout is kept raw and flagged, the validator decides.
fn reformat_issue_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%d.%m.%Y").to_string(),
        Err(_) => {
            warn!(value = raw, "unexpected IssueDate layout, kept as-is");
            raw.to_string()
        }
    }
}

fn parse_amount_opt(text: &str, field: &str) -> Option<f64> {
    match text.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(value = text, field, "numeric coercion failed, field nulled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PREFIXED_INVOICE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
         xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"
         xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
  <cbc:ID>FAT2024000001</cbc:ID>
  <cbc:IssueDate>2024-07-21</cbc:IssueDate>
  <cac:AccountingSupplierParty>
    <cac:Party>
      <cac:PartyIdentification>
        <cbc:ID schemeID="VKN">1234567890</cbc:ID>
      </cac:PartyIdentification>
      <cac:PartyName>
        <cbc:Name>SELLER CORP A.S.</cbc:Name>
      </cac:PartyName>
    </cac:Party>
  </cac:AccountingSupplierParty>
  <cac:AccountingCustomerParty>
    <cac:Party>
      <cac:PartyIdentification>
        <cbc:ID schemeID="TCKN">12345678901</cbc:ID>
      </cac:PartyIdentification>
      <cac:PartyName>
        <cbc:Name>BUYER LTD</cbc:Name>
      </cac:PartyName>
    </cac:Party>
  </cac:AccountingCustomerParty>
  <cac:TaxTotal>
    <cbc:TaxAmount currencyID="TRY">200.00</cbc:TaxAmount>
    <cac:TaxSubtotal>
      <cbc:TaxableAmount currencyID="TRY">1000.00</cbc:TaxableAmount>
      <cbc:TaxAmount currencyID="TRY">200.00</cbc:TaxAmount>
      <cac:TaxCategory>
        <cbc:Percent>20</cbc:Percent>
      </cac:TaxCategory>
    </cac:TaxSubtotal>
  </cac:TaxTotal>
  <cac:LegalMonetaryTotal>
    <cbc:LineExtensionAmount currencyID="TRY">1000.00</cbc:LineExtensionAmount>
    <cbc:PayableAmount currencyID="TRY">1200.00</cbc:PayableAmount>
  </cac:LegalMonetaryTotal>
</Invoice>"#;

    #[test]
    fn test_parses_prefixed_invoice() {
        let record = extract_ubl_invoice(PREFIXED_INVOICE).unwrap();

        assert_eq!(record.invoice_number.as_deref(), Some("FAT2024000001"));
        assert_eq!(record.issue_date.as_deref(), Some("21.07.2024"));
        assert_eq!(record.seller_tax_id.as_deref(), Some("1234567890"));
        assert_eq!(record.seller_name.as_deref(), Some("SELLER CORP A.S."));
        assert_eq!(record.buyer_tax_id.as_deref(), Some("12345678901"));
        assert_eq!(record.buyer_name.as_deref(), Some("BUYER LTD"));
        assert_eq!(record.tax_base, Some(serde_json::json!(1000.0)));
        assert_eq!(record.tax_amount, Some(serde_json::json!(200.0)));
        assert_eq!(record.grand_total, Some(serde_json::json!(1200.0)));
        assert_eq!(record.tax_rate, Some(serde_json::json!(20.0)));
        assert_eq!(record.tax_breakdown.len(), 1);
        assert_eq!(record.tax_breakdown[0].rate, Some(20.0));
        assert_eq!(record.tax_breakdown[0].base, Some(1000.0));
    }

    #[test]
    fn test_parses_unprefixed_elements() {
        let xml = r#"<Invoice>
  <ID>FT-42</ID>
  <IssueDate>2023-01-05</IssueDate>
  <LegalMonetaryTotal>
    <LineExtensionAmount>100.00</LineExtensionAmount>
    <PayableAmount>120.00</PayableAmount>
  </LegalMonetaryTotal>
</Invoice>"#;

        let record = extract_ubl_invoice(xml).unwrap();
        assert_eq!(record.invoice_number.as_deref(), Some("FT-42"));
        assert_eq!(record.issue_date.as_deref(), Some("05.01.2023"));
        assert_eq!(record.grand_total, Some(serde_json::json!(120.0)));
    }

    #[test]
    fn test_multiple_tax_totals_are_summed() {
        let xml = r#"<Invoice>
  <ID>FT-7</ID>
  <IssueDate>2024-03-01</IssueDate>
  <TaxTotal>
    <TaxAmount>100.00</TaxAmount>
    <TaxSubtotal>
      <TaxableAmount>1000.00</TaxableAmount>
      <TaxAmount>100.00</TaxAmount>
      <TaxCategory><Percent>10</Percent></TaxCategory>
    </TaxSubtotal>
  </TaxTotal>
  <TaxTotal>
    <TaxAmount>40.00</TaxAmount>
    <TaxSubtotal>
      <TaxableAmount>200.00</TaxableAmount>
      <TaxAmount>40.00</TaxAmount>
      <TaxCategory><Percent>20</Percent></TaxCategory>
    </TaxSubtotal>
  </TaxTotal>
  <LegalMonetaryTotal>
    <LineExtensionAmount>1200.00</LineExtensionAmount>
    <PayableAmount>1340.00</PayableAmount>
  </LegalMonetaryTotal>
</Invoice>"#;

        let record = extract_ubl_invoice(xml).unwrap();
        assert_eq!(record.tax_amount, Some(serde_json::json!(140.0)));
        assert_eq!(record.tax_breakdown.len(), 2);
        // first subtotal rate in document order wins
        assert_eq!(record.tax_rate, Some(serde_json::json!(10.0)));
    }

    #[test]
    fn test_missing_grand_total_is_rejected() {
        let xml = r#"<Invoice>
  <ID>FT-9</ID>
  <IssueDate>2024-03-01</IssueDate>
</Invoice>"#;

        let err = extract_ubl_invoice(xml).unwrap_err();
        assert!(matches!(err, ExtractionFailure::ParseFailure(_)));
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        let err = extract_ubl_invoice("<Invoice><ID>broken").unwrap_err();
        assert!(matches!(err, ExtractionFailure::ParseFailure(_)));
    }

    #[test]
    fn test_unexpected_date_layout_is_kept_raw() {
        let xml = r#"<Invoice>
  <ID>FT-10</ID>
  <IssueDate>21/07/2024</IssueDate>
  <LegalMonetaryTotal>
    <PayableAmount>50.00</PayableAmount>
  </LegalMonetaryTotal>
</Invoice>"#;

        let record = extract_ubl_invoice(xml).unwrap();
        assert_eq!(record.issue_date.as_deref(), Some("21/07/2024"));
    }

    #[test]
    fn test_person_first_name_fallback() {
        let xml = r#"<Invoice>
  <ID>FT-11</ID>
  <IssueDate>2024-02-02</IssueDate>
  <AccountingSupplierParty>
    <Party>
      <PartyIdentification>
        <ID schemeID="TCKN">12345678901</ID>
      </PartyIdentification>
      <Person>
        <FirstName>AHMET</FirstName>
      </Person>
    </Party>
  </AccountingSupplierParty>
  <LegalMonetaryTotal>
    <PayableAmount>75.00</PayableAmount>
  </LegalMonetaryTotal>
</Invoice>"#;

        let record = extract_ubl_invoice(xml).unwrap();
        assert_eq!(record.seller_tax_id.as_deref(), Some("12345678901"));
        assert_eq!(record.seller_name.as_deref(), Some("AHMET"));
    }
}
