// 💳 Card Brand - rule-driven scheme detection from the leading digits

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardBrand {
    Visa,
    Mastercard,
    AmericanExpress,
    Discover,
    Jcb,
    UnionPay,
    DinersClub,
    Unknown,
}

impl CardBrand {
    /// Human-readable name for display and export
    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "Visa",
            CardBrand::Mastercard => "Mastercard",
            CardBrand::AmericanExpress => "American Express",
            CardBrand::Discover => "Discover",
            CardBrand::Jcb => "JCB",
            CardBrand::UnionPay => "UnionPay",
            CardBrand::DinersClub => "Diners Club",
            CardBrand::Unknown => "Unknown",
        }
    }

    /// Parse a brand name leniently.
    ///
    /// Accepts display names ("American Express") and lookup-service scheme
    /// names ("amex", "diners"). Anything unrecognized becomes `Unknown`.
    pub fn from_name(name: &str) -> CardBrand {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "visa" => CardBrand::Visa,
            "mastercard" | "mc" => CardBrand::Mastercard,
            "americanexpress" | "amex" => CardBrand::AmericanExpress,
            "discover" => CardBrand::Discover,
            "jcb" => CardBrand::Jcb,
            "unionpay" | "chinaunionpay" => CardBrand::UnionPay,
            "dinersclub" | "diners" | "dinersclubinternational" => CardBrand::DinersClub,
            _ => CardBrand::Unknown,
        }
    }

    pub fn all() -> [CardBrand; 8] {
        [
            CardBrand::Visa,
            CardBrand::Mastercard,
            CardBrand::AmericanExpress,
            CardBrand::Discover,
            CardBrand::Jcb,
            CardBrand::UnionPay,
            CardBrand::DinersClub,
            CardBrand::Unknown,
        ]
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the brand from the leading digits of a card number.
///
/// Rules are checked in order and are mutually exclusive:
/// 4 → Visa, 51-55 → Mastercard, 34/37 → Amex, 6011/644-649/65 → Discover,
/// 35 → JCB, 62 → UnionPay, 36/38/39 → Diners Club.
pub fn detect_brand(digits: &str) -> CardBrand {
    let prefix = |len: usize| digits.get(..len).filter(|p| p.len() == len);
    let first_two = prefix(2).and_then(|p| p.parse::<u8>().ok());
    let first_three = prefix(3).and_then(|p| p.parse::<u16>().ok());

    if digits.starts_with('4') {
        return CardBrand::Visa;
    }

    match first_two {
        Some(51..=55) => return CardBrand::Mastercard,
        Some(34) | Some(37) => return CardBrand::AmericanExpress,
        _ => {}
    }

    if prefix(4) == Some("6011") || matches!(first_three, Some(644..=649)) || first_two == Some(65) {
        return CardBrand::Discover;
    }

    match first_two {
        Some(35) => CardBrand::Jcb,
        Some(62) => CardBrand::UnionPay,
        Some(36) | Some(38) | Some(39) => CardBrand::DinersClub,
        _ => CardBrand::Unknown,
    }
}

// ============================================================================
// TESTS
// ============================================================================
