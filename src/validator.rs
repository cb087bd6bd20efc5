// ✅ Card Validator - structural checks for card numbers
// Length window + Luhn checksum, no side effects, never fails

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest accepted card number
pub const MIN_CARD_LENGTH: usize = 13;

/// Longest accepted card number
pub const MAX_CARD_LENGTH: usize = 19;

// ============================================================================
// VALIDATION OUTCOME
// ============================================================================

/// Why a card number was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// Something other than digits and whitespace was supplied
    NonDigit,

    /// Digit count outside 13..=19
    Length,

    /// Luhn checksum failed
    Checksum,
}

impl InvalidReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidReason::NonDigit => "Invalid characters",
            InvalidReason::Length => "Invalid length",
            InvalidReason::Checksum => "Failed checksum",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Input with whitespace removed (kept even when it is not all digits)
    pub normalized: String,

    /// Only digits, and 13..=19 of them
    pub length_ok: bool,

    /// Luhn result, computed even when the length is wrong
    pub luhn_ok: bool,
}

impl ValidationOutcome {
    /// Overall validity: both checks must pass
    pub fn is_valid(&self) -> bool {
        self.length_ok && self.luhn_ok
    }

    /// First failing check, if any
    pub fn failure(&self) -> Option<InvalidReason> {
        if !self.normalized.is_empty() && !is_all_digits(&self.normalized) {
            Some(InvalidReason::NonDigit)
        } else if !self.length_ok {
            Some(InvalidReason::Length)
        } else if !self.luhn_ok {
            Some(InvalidReason::Checksum)
        } else {
            None
        }
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Strip every whitespace character from raw input
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Luhn mod-10 check over a digit string.
///
/// Returns false for empty input or anything containing a non-digit.
pub fn luhn_valid(digits: &str) -> bool {
    if !is_all_digits(digits) {
        return false;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();

    sum % 10 == 0
}

/// Validate a raw, possibly formatted, card number
pub fn validate(raw: &str) -> ValidationOutcome {
    let normalized = normalize(raw);

    if !is_all_digits(&normalized) {
        return ValidationOutcome {
            normalized,
            length_ok: false,
            luhn_ok: false,
        };
    }

    let length_ok = (MIN_CARD_LENGTH..=MAX_CARD_LENGTH).contains(&normalized.len());
    let luhn_ok = luhn_valid(&normalized);

    ValidationOutcome {
        normalized,
        length_ok,
        luhn_ok,
    }
}

// ============================================================================
// CARD NUMBER
// ============================================================================

/// A card number that passed normalization and the length window.
///
/// Luhn validity is NOT part of the invariant; use [`validate`] for that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardNumber(String);

impl CardNumber {
    /// Normalize and wrap; `None` if non-digits remain or length is out of range
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize(raw);
        if is_all_digits(&normalized)
            && (MIN_CARD_LENGTH..=MAX_CARD_LENGTH).contains(&normalized.len())
        {
            Some(CardNumber(normalized))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading six digits
    pub fn bin(&self) -> &str {
        &self.0[..6]
    }

    /// Groups of four separated by spaces: "4111 1111 1111 1111"
    pub fn formatted(&self) -> String {
        format_digits(&self.0)
    }

    /// First six and last four digits visible, the rest replaced by '*'
    pub fn masked(&self) -> String {
        mask_digits(&self.0)
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Group a string in chunks of four characters
pub fn format_digits(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Mask everything except the first six and last four characters.
///
/// Strings of ten characters or fewer are fully masked.
pub fn mask_digits(s: &str) -> String {
    let len = s.chars().count();
    if len <= 10 {
        return "*".repeat(len);
    }

    s.chars()
        .enumerate()
        .map(|(i, c)| if i < 6 || i >= len - 4 { c } else { '*' })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
