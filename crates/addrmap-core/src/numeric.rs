//! Address literal codec for binary, hexadecimal, and decimal values.
//!
//! Hardware descriptions write addresses as `0b…`, `0x…` or `0h…` literals.
//! Parsing is strict: one bad digit rejects the whole literal instead of
//! producing a partial value. Callers that want malformed literals to read
//! as zero opt into that through [`parse_literal_or_zero`].

use thiserror::Error;

/// Prefix written in front of rendered hexadecimal literals.
pub const HEX_PREFIX: &str = "0x";
/// Prefix written in front of rendered binary literals.
pub const BINARY_PREFIX: &str = "0b";

/// Error produced when an address literal cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    /// The literal contained no characters at all.
    #[error("empty address literal")]
    Empty,
    /// A character is not a digit of the literal's base.
    #[error("invalid digit '{digit}' in address literal '{literal}'")]
    InvalidDigit {
        /// The literal as written.
        literal: String,
        /// The first offending character.
        digit: char,
    },
    /// The value does not fit in 64 bits.
    #[error("address literal '{literal}' does not fit in 64 bits")]
    Overflow {
        /// The literal as written.
        literal: String,
    },
}

/// Parses a binary literal with an optional `0b` prefix.
///
/// An empty digit string reads as zero.
///
/// # Errors
///
/// Returns [`LiteralError::InvalidDigit`] when any digit is not `0`/`1` and
/// [`LiteralError::Overflow`] when the value exceeds `u64::MAX`.
pub fn parse_binary(literal: &str) -> Result<u64, LiteralError> {
    let trimmed = literal.trim();
    let digits = strip_binary_prefix(trimmed).unwrap_or(trimmed);
    accumulate(trimmed, digits, 2)
}

/// Parses a hexadecimal literal with an optional `0x` or `0h` prefix.
///
/// Letter digits are accepted in either case. An empty digit string reads
/// as zero.
///
/// # Errors
///
/// Returns [`LiteralError::InvalidDigit`] for any non-hex character and
/// [`LiteralError::Overflow`] when the value exceeds `u64::MAX`.
pub fn parse_hex(literal: &str) -> Result<u64, LiteralError> {
    let trimmed = literal.trim();
    let digits = strip_hex_prefix(trimmed).unwrap_or(trimmed);
    accumulate(trimmed, digits, 16)
}

/// Parses an unprefixed decimal literal.
///
/// # Errors
///
/// Returns [`LiteralError::Empty`] for an empty literal, otherwise the same
/// digit and overflow errors as the other parsers.
pub fn parse_decimal(literal: &str) -> Result<u64, LiteralError> {
    let trimmed = literal.trim();
    if trimmed.is_empty() {
        return Err(LiteralError::Empty);
    }
    accumulate(trimmed, trimmed, 10)
}

/// Parses a literal in whichever base its prefix names.
///
/// `0b` selects binary, `0x`/`0h` select hexadecimal, anything else is
/// read as decimal.
///
/// # Errors
///
/// Propagates the error of the selected base parser.
pub fn parse_literal(literal: &str) -> Result<u64, LiteralError> {
    let trimmed = literal.trim();
    if let Some(digits) = strip_binary_prefix(trimmed) {
        accumulate(trimmed, digits, 2)
    } else if let Some(digits) = strip_hex_prefix(trimmed) {
        accumulate(trimmed, digits, 16)
    } else {
        parse_decimal(trimmed)
    }
}

/// Parses a literal, reading any malformed value as zero.
#[must_use]
pub fn parse_literal_or_zero(literal: &str) -> u64 {
    parse_literal(literal).unwrap_or(0)
}

/// Renders `value` as an upper-case `0x` literal padded to `min_digits`.
///
/// Zero emits no significant digits, so `format_hex(0, 0)` is just `0x`.
#[must_use]
pub fn format_hex(value: u64, min_digits: usize) -> String {
    let digits = if value == 0 {
        String::new()
    } else {
        format!("{value:X}")
    };
    format!("{HEX_PREFIX}{digits:0>min_digits$}")
}

/// Renders `value` as a `0b` literal padded to `min_digits`.
///
/// Zero emits no significant digits, matching [`format_hex`].
#[must_use]
pub fn format_binary(value: u64, min_digits: usize) -> String {
    let digits = if value == 0 {
        String::new()
    } else {
        format!("{value:b}")
    };
    format!("{BINARY_PREFIX}{digits:0>min_digits$}")
}

fn strip_binary_prefix(literal: &str) -> Option<&str> {
    literal
        .strip_prefix("0b")
        .or_else(|| literal.strip_prefix("0B"))
}

fn strip_hex_prefix(literal: &str) -> Option<&str> {
    ["0x", "0X", "0h", "0H"]
        .iter()
        .find_map(|prefix| literal.strip_prefix(prefix))
}

fn accumulate(literal: &str, digits: &str, radix: u32) -> Result<u64, LiteralError> {
    digits.chars().try_fold(0_u64, |acc, ch| {
        let digit = ch.to_digit(radix).ok_or_else(|| LiteralError::InvalidDigit {
            literal: literal.to_string(),
            digit: ch,
        })?;
        acc.checked_mul(u64::from(radix))
            .and_then(|shifted| shifted.checked_add(u64::from(digit)))
            .ok_or_else(|| LiteralError::Overflow {
                literal: literal.to_string(),
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_accepts_both_prefixes_and_cases() {
        assert_eq!(parse_hex("0x1F"), Ok(0x1F));
        assert_eq!(parse_hex("0h1f"), Ok(0x1F));
        assert_eq!(parse_hex("0XdeadBEEF"), Ok(0xDEAD_BEEF));
        assert_eq!(parse_hex("FF"), Ok(0xFF));
    }

    #[test]
    fn hex_rejects_whole_value_on_bad_letter() {
        assert_eq!(
            parse_hex("0x12G4"),
            Err(LiteralError::InvalidDigit {
                literal: "0x12G4".to_string(),
                digit: 'G'
            })
        );
    }

    #[test]
    fn binary_rejects_whole_value_on_bad_digit() {
        assert_eq!(parse_binary("0b1011"), Ok(0b1011));
        assert!(matches!(
            parse_binary("0b1021"),
            Err(LiteralError::InvalidDigit { digit: '2', .. })
        ));
    }

    #[test]
    fn empty_digits_read_as_zero() {
        assert_eq!(parse_hex("0x"), Ok(0));
        assert_eq!(parse_binary("0b"), Ok(0));
        assert_eq!(parse_decimal(""), Err(LiteralError::Empty));
    }

    #[test]
    fn overflow_is_reported() {
        assert!(matches!(
            parse_hex("0x1_0000_0000_0000_0000"),
            Err(LiteralError::InvalidDigit { digit: '_', .. })
        ));
        assert!(matches!(
            parse_hex("0x10000000000000000"),
            Err(LiteralError::Overflow { .. })
        ));
        assert_eq!(parse_hex("0xFFFFFFFFFFFFFFFF"), Ok(u64::MAX));
    }

    #[test]
    fn literal_dispatches_on_prefix() {
        assert_eq!(parse_literal("0b101"), Ok(5));
        assert_eq!(parse_literal("0x10"), Ok(16));
        assert_eq!(parse_literal("0h10"), Ok(16));
        assert_eq!(parse_literal("  42 "), Ok(42));
    }

    #[test]
    fn fail_soft_fallback_is_zero() {
        assert_eq!(parse_literal_or_zero("0xZZ"), 0);
        assert_eq!(parse_literal_or_zero(""), 0);
        assert_eq!(parse_literal_or_zero("0x8000"), 0x8000);
    }

    #[test]
    fn hex_rendering_pads_and_uppercases() {
        assert_eq!(format_hex(0xabc, 8), "0x00000ABC");
        assert_eq!(format_hex(0xFFFF_FFFF, 4), "0xFFFFFFFF");
        assert_eq!(format_hex(0, 8), "0x00000000");
        assert_eq!(format_hex(0, 0), "0x");
    }

    #[test]
    fn binary_rendering_pads() {
        assert_eq!(format_binary(5, 8), "0b00000101");
        assert_eq!(format_binary(0, 0), "0b");
        assert_eq!(format_binary(0b1, 1), "0b1");
    }
}
