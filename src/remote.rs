// 🌐 Remote BIN Lookup - optional external service behind a trait
//
// The classifier only talks to `dyn RemoteLookup`, so tests can plug in a
// fake backend and production can plug in the binlist HTTP client.

use crate::bin_table::{BinEntry, Provenance, UNKNOWN};
use crate::brand::{detect_brand, CardBrand};
use crate::country::{UNKNOWN_COUNTRY_CODE, UNKNOWN_CURRENCY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default lookup service
pub const DEFAULT_ENDPOINT: &str = "https://lookup.binlist.net";

/// Reference timeout for a single lookup
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

// ============================================================================
// ERRORS
// ============================================================================

/// Transient lookup failures. The classifier never lets these escape.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("BIN lookup timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("BIN lookup returned status {0}")]
    Status(u16),

    #[error("BIN lookup transport error: {0}")]
    Transport(String),

    #[error("Malformed BIN lookup payload: {0}")]
    Payload(String),
}

// ============================================================================
// BACKEND TRAIT
// ============================================================================

/// RemoteLookup - a source of issuer metadata for a 6-digit BIN
pub trait RemoteLookup: Send + Sync {
    /// Look up one BIN.
    ///
    /// # Returns
    /// * `Ok(BinEntry)` - tagged with `Provenance::Remote`
    /// * `Err(LookupError)` - timeout, non-success status, bad payload
    fn lookup(&self, bin: &str) -> Result<BinEntry, LookupError>;

    /// Backend name for logs
    fn name(&self) -> &str {
        "remote"
    }
}

// ============================================================================
// WIRE FORMAT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BinlistBank {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, rename = "zipCode")]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BinlistCountry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alpha2: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Response body of a binlist-compatible service. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BinlistResponse {
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default, rename = "type")]
    pub card_type: Option<String>,
    #[serde(default)]
    pub bank: Option<BinlistBank>,
    #[serde(default)]
    pub country: Option<BinlistCountry>,
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

impl BinlistResponse {
    /// Map to a `BinEntry`; missing fields become explicit placeholders
    pub fn into_entry(self, bin: &str) -> BinEntry {
        let brand = self
            .scheme
            .as_deref()
            .map(CardBrand::from_name)
            .filter(|b| *b != CardBrand::Unknown)
            .unwrap_or_else(|| detect_brand(bin));

        let bank = self.bank.unwrap_or_default();
        let country = self.country.unwrap_or_default();

        BinEntry {
            prefix: bin.to_string(),
            brand,
            card_type: or_placeholder(self.card_type, UNKNOWN),
            country: or_placeholder(country.name, "Unknown Country"),
            country_code: or_placeholder(country.alpha2, UNKNOWN_COUNTRY_CODE),
            bank: or_placeholder(bank.name, "Unknown Bank"),
            city: or_placeholder(bank.city, "Unknown City"),
            state: or_placeholder(bank.state, "Unknown State"),
            zip: or_placeholder(bank.zip_code, UNKNOWN),
            currency: or_placeholder(country.currency, UNKNOWN_CURRENCY),
            provenance: Provenance::Remote,
        }
    }
}

/// Parse a response body
pub fn parse_response(body: &str, bin: &str) -> Result<BinEntry, LookupError> {
    let response: BinlistResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Payload(e.to_string()))?;
    Ok(response.into_entry(bin))
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

#[cfg(feature = "remote")]
pub use http::BinlistClient;

#[cfg(feature = "remote")]
mod http {
    use super::{parse_response, LookupError, RemoteLookup};
    use crate::bin_table::BinEntry;
    use std::time::Duration;

    /// Blocking HTTP client for a binlist-compatible endpoint
    pub struct BinlistClient {
        client: reqwest::blocking::Client,
        endpoint: String,
        timeout_ms: u64,
    }

    impl BinlistClient {
        pub fn new(endpoint: &str, timeout_ms: u64) -> anyhow::Result<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .user_agent(concat!("card-checker/", env!("CARGO_PKG_VERSION")))
                .build()?;

            Ok(BinlistClient {
                client,
                endpoint: endpoint.trim_end_matches('/').to_string(),
                timeout_ms,
            })
        }

        pub fn endpoint(&self) -> &str {
            &self.endpoint
        }

        fn map_error(&self, err: reqwest::Error) -> LookupError {
            if err.is_timeout() {
                LookupError::Timeout { ms: self.timeout_ms }
            } else {
                LookupError::Transport(err.to_string())
            }
        }
    }

    impl RemoteLookup for BinlistClient {
        fn lookup(&self, bin: &str) -> Result<BinEntry, LookupError> {
            let url = format!("{}/{}", self.endpoint, bin);

            let response = self
                .client
                .get(&url)
                .header("Accept-Version", "3")
                .send()
                .map_err(|e| self.map_error(e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(LookupError::Status(status.as_u16()));
            }

            let body = response.text().map_err(|e| self.map_error(e))?;
            parse_response(&body, bin)
        }

        fn name(&self) -> &str {
            "binlist"
        }
    }

}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_payload() {
        let body = r#"{
            "number": {"length": 16, "luhn": true},
            "scheme": "visa",
            "type": "debit",
            "brand": "Visa/Dankort",
            "country": {"numeric": "208", "alpha2": "DK", "name": "Denmark", "currency": "DKK"},
            "bank": {"name": "Jyske Bank", "city": "Hjørring"}
        }"#;

        let entry = parse_response(body, "457173").unwrap();
        assert_eq!(entry.prefix, "457173");
        assert_eq!(entry.brand, CardBrand::Visa);
        assert_eq!(entry.card_type, "debit");
        assert_eq!(entry.country, "Denmark");
        assert_eq!(entry.country_code, "DK");
        assert_eq!(entry.currency, "DKK");
        assert_eq!(entry.bank, "Jyske Bank");
        assert_eq!(entry.city, "Hjørring");
        assert_eq!(entry.state, "Unknown State");
        assert_eq!(entry.zip, "Unknown");
        assert_eq!(entry.provenance, Provenance::Remote);
    }

    #[test]
    fn test_empty_object_maps_to_placeholders() {
        let entry = parse_response("{}", "371449").unwrap();
        assert_eq!(entry.brand, CardBrand::AmericanExpress);
        assert_eq!(entry.card_type, "Unknown");
        assert_eq!(entry.bank, "Unknown Bank");
        assert_eq!(entry.city, "Unknown City");
        assert_eq!(entry.country, "Unknown Country");
        assert_eq!(entry.country_code, "XX");
        assert_eq!(entry.currency, "Unknown");
    }

    #[test]
    fn test_unrecognized_scheme_uses_rules() {
        let entry = parse_response(r#"{"scheme": "maestro-ish", "bank": {}}"#, "601100").unwrap();
        assert_eq!(entry.brand, CardBrand::Discover);
        assert_eq!(entry.bank, "Unknown Bank");
    }

    #[test]
    fn test_null_fields_are_placeholders() {
        let entry = parse_response(r#"{"scheme": null, "bank": {"name": null}, "country": null}"#, "555555").unwrap();
        assert_eq!(entry.brand, CardBrand::Mastercard);
        assert_eq!(entry.bank, "Unknown Bank");
        assert_eq!(entry.country, "Unknown Country");
    }

    #[test]
    fn test_malformed_payload() {
        let err = parse_response("<html>rate limited</html>", "411111").unwrap_err();
        assert!(matches!(err, LookupError::Payload(_)));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(LookupError::Status(429).to_string(), "BIN lookup returned status 429");
        assert_eq!(
            LookupError::Timeout { ms: 5000 }.to_string(),
            "BIN lookup timed out after 5000ms"
        );
    }
}
