//! Tax identification number normalization.
//!
//! Turkish tax IDs come in two shapes: a 10-digit VKN for legal entities and
//! an 11-digit TCKN for individuals. Only the digit count is checked here;
//! checksum verification is out of scope.

use crate::error::NormalizeError;

/// Strip everything but digits and verify the result is 10 or 11 digits long.
pub fn normalize_tax_id(raw: &str) -> Result<String, NormalizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::MissingOrWrongType);
    }

    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 | 11 => Ok(digits),
        n => Err(NormalizeError::InvalidLength {
            digits: n,
            value: trimmed.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_vkn_is_accepted() {
        assert_eq!(normalize_tax_id("1234567890").unwrap(), "1234567890");
    }

    #[test]
    fn test_plain_tckn_is_accepted() {
        assert_eq!(normalize_tax_id("12345678901").unwrap(), "12345678901");
    }

    #[test]
    fn test_punctuation_and_spaces_are_stripped() {
        assert_eq!(normalize_tax_id("123 456 78 90").unwrap(), "1234567890");
        assert_eq!(normalize_tax_id("VKN: 123-456-7890").unwrap(), "1234567890");
    }

    #[test]
    fn test_wrong_digit_count_is_rejected() {
        assert!(matches!(
            normalize_tax_id("123456789"),
            Err(NormalizeError::InvalidLength { digits: 9, .. })
        ));
        assert!(matches!(
            normalize_tax_id("123456789012"),
            Err(NormalizeError::InvalidLength { digits: 12, .. })
        ));
    }

    #[test]
    fn test_no_digits_is_rejected() {
        assert!(normalize_tax_id("unknown").is_err());
        assert!(normalize_tax_id("").is_err());
    }
}
