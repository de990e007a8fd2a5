//! Monetary amount normalization.
//!
//! Extractors deliver amounts either as JSON numbers or as formatted strings
//! in mixed locale conventions ("1.234,56", "1,234.56", "1234.56"). The last
//! `.` or `,` in the string is taken as the decimal separator and every other
//! separator is treated as grouping.

use serde_json::Value;

use crate::error::NormalizeError;

/// Coerce a raw JSON value to a plain `f64` amount.
pub fn normalize_amount(raw: Option<&Value>) -> Result<f64, NormalizeError> {
    let value = raw.ok_or(NormalizeError::Missing)?;

    match value {
        Value::Null => Err(NormalizeError::Missing),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| NormalizeError::InvalidFormat(n.to_string())),
        Value::String(s) => parse_amount_str(s),
        other => Err(NormalizeError::InvalidType(json_type_name(other).to_string())),
    }
}

fn parse_amount_str(raw: &str) -> Result<f64, NormalizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::Missing);
    }

    let mut cleaned = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        if c.is_ascii_digit() || c == '.' || c == ',' || c == '-' {
            cleaned.push(c);
        }
    }
    if cleaned.is_empty() {
        return Err(NormalizeError::InvalidFormat(trimmed.to_string()));
    }

    // The rightmost separator is decimal; everything before it is grouping.
    let normalized = match cleaned.rfind(['.', ',']) {
        Some(pos) => {
            let (head, tail) = cleaned.split_at(pos);
            let head: String = head.chars().filter(|c| *c != '.' && *c != ',').collect();
            let tail = tail.replacen([',', '.'], ".", 1);
            format!("{head}{tail}")
        }
        None => cleaned,
    };

    normalized
        .parse::<f64>()
        .map_err(|_| NormalizeError::InvalidFormat(trimmed.to_string()))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_number_passes_through() {
        assert_eq!(normalize_amount(Some(&json!(1234.56))).unwrap(), 1234.56);
        assert_eq!(normalize_amount(Some(&json!(20))).unwrap(), 20.0);
    }

    #[test]
    fn test_turkish_grouping() {
        assert_eq!(
            normalize_amount(Some(&json!("1.234,56"))).unwrap(),
            1234.56
        );
        assert_eq!(
            normalize_amount(Some(&json!("12.345.678,90"))).unwrap(),
            12_345_678.90
        );
    }

    #[test]
    fn test_english_grouping() {
        assert_eq!(
            normalize_amount(Some(&json!("1,234.56"))).unwrap(),
            1234.56
        );
    }

    #[test]
    fn test_plain_decimal_string() {
        assert_eq!(normalize_amount(Some(&json!("1234.56"))).unwrap(), 1234.56);
        assert_eq!(normalize_amount(Some(&json!("500,10"))).unwrap(), 500.10);
    }

    #[test]
    fn test_currency_noise_is_stripped() {
        assert_eq!(
            normalize_amount(Some(&json!("1.234,56 TL"))).unwrap(),
            1234.56
        );
        assert_eq!(normalize_amount(Some(&json!("₺ 500,10"))).unwrap(), 500.10);
    }

    #[test]
    fn test_missing_values() {
        assert_eq!(normalize_amount(None), Err(NormalizeError::Missing));
        assert_eq!(
            normalize_amount(Some(&Value::Null)),
            Err(NormalizeError::Missing)
        );
        assert_eq!(
            normalize_amount(Some(&json!("   "))),
            Err(NormalizeError::Missing)
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            normalize_amount(Some(&json!("n/a."))),
            Err(NormalizeError::InvalidFormat(_))
        ));
        assert!(matches!(
            normalize_amount(Some(&json!(true))),
            Err(NormalizeError::InvalidType(_))
        ));
        assert!(matches!(
            normalize_amount(Some(&json!([1, 2]))),
            Err(NormalizeError::InvalidType(_))
        ));
    }
}
