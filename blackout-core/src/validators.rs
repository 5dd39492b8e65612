// File: blackout-core/src/validators.rs
//! Programmatic validation functions for specific sensitive data types.
//!
//! This module provides additional validation logic beyond regular expression
//! matching. Pattern matches that also pass a checksum earn a confidence
//! boost in the scoring layer; the checks themselves live here so they can be
//! tested in isolation.
//!
//! License: MIT OR APACHE 2.0

/// Validates a number using the Luhn algorithm.
///
/// The Luhn algorithm, also known as the Mod 10 algorithm, is a simple
/// checksum formula used to validate a variety of identification numbers,
/// such as credit card numbers. Walking from the rightmost digit, every
/// second digit is doubled; doubled digits greater than 9 have 9 subtracted
/// (equivalent to summing their decimal digits). The number is valid iff the
/// total is divisible by 10.
///
/// # Arguments
///
/// * `num_str` - A string slice containing only digits.
///
/// # Returns
///
/// `true` if the number is valid according to the Luhn algorithm, `false` otherwise.
pub fn is_valid_luhn(num_str: &str) -> bool {
    let mut sum = 0;
    let mut alternate = false;

    for c in num_str.chars().rev() {
        let Some(mut digit) = c.to_digit(10) else { return false; };

        if alternate {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        alternate = !alternate;
    }

    sum % 10 == 0
}

/// Helper function to validate card-like numbers based on the Luhn algorithm.
///
/// This function first strips all non-digit characters (dashes, spaces) from
/// the input string and then applies the Luhn algorithm to the resulting
/// digit string.
///
/// # Arguments
///
/// * `number` - The card number string slice to validate.
///
/// # Returns
///
/// `true` if the number is valid according to the Luhn algorithm, `false` otherwise.
pub fn is_valid_card_number(number: &str) -> bool {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return false;
    }
    is_valid_luhn(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luhn_reference_vectors() {
        assert!(is_valid_luhn("4111111111111111"));
        assert!(!is_valid_luhn("4111111111111112"));
    }

    #[test]
    fn test_luhn_rejects_non_digits() {
        assert!(!is_valid_luhn("4111-1111-1111-1111"));
    }

    #[test]
    fn test_card_number_strips_separators() {
        assert!(is_valid_card_number("4111-1111-1111-1111"));
        assert!(is_valid_card_number("4111 1111 1111 1111"));
        assert!(!is_valid_card_number("4111-1111-1111-1112"));
    }

    #[test]
    fn test_card_number_rejects_empty() {
        assert!(!is_valid_card_number(""));
        assert!(!is_valid_card_number("----"));
    }
}
