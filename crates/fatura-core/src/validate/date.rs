//! Issue-date normalization.

use chrono::NaiveDate;

use crate::error::NormalizeError;

/// Normalize a raw date string to canonical `DD.MM.YYYY`.
///
/// Accepts `.`, `-`, and `/` as separators and pads one-digit day and month
/// components. The result is verified to be a real calendar date.
pub fn normalize_date(raw: &str) -> Result<String, NormalizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::MissingOrWrongType);
    }

    let unified = trimmed.replace(['-', '/'], ".");
    let parts: Vec<&str> = unified.split('.').collect();
    if parts.len() != 3 {
        return Err(NormalizeError::InvalidFormat(trimmed.to_string()));
    }

    let day = pad2(parts[0]);
    let month = pad2(parts[1]);
    let year = parts[2];

    let candidate = format!("{day}.{month}.{year}");
    match NaiveDate::parse_from_str(&candidate, "%d.%m.%Y") {
        Ok(date) => Ok(date.format("%d.%m.%Y").to_string()),
        Err(_) => Err(NormalizeError::InvalidFormat(trimmed.to_string())),
    }
}

fn pad2(s: &str) -> String {
    let s = s.trim();
    if s.len() == 1 {
        format!("0{s}")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_date_passes_through() {
        assert_eq!(normalize_date("21.07.2024").unwrap(), "21.07.2024");
    }

    #[test]
    fn test_separators_are_unified() {
        assert_eq!(normalize_date("21-07-2024").unwrap(), "21.07.2024");
        assert_eq!(normalize_date("21/07/2024").unwrap(), "21.07.2024");
    }

    #[test]
    fn test_single_digit_components_are_padded() {
        assert_eq!(normalize_date("1.7.2024").unwrap(), "01.07.2024");
        assert_eq!(normalize_date("9/3/2023").unwrap(), "09.03.2023");
    }

    #[test]
    fn test_impossible_date_is_rejected() {
        assert!(normalize_date("32.13.2024").is_err());
        assert!(normalize_date("29.02.2023").is_err());
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        assert!(normalize_date("2024").is_err());
        assert!(normalize_date("21.07").is_err());
        assert!(normalize_date("not a date").is_err());
        assert!(normalize_date("").is_err());
    }

    #[test]
    fn test_leap_day_is_accepted() {
        assert_eq!(normalize_date("29.02.2024").unwrap(), "29.02.2024");
    }
}
