// 🗂️ BIN Table - static prefix → issuer metadata, longest-prefix match
//
// The table is immutable once built. Keys are 1-8 digit prefixes; a lookup
// tries the longest candidate first so a bank-specific 6-digit BIN always
// wins over a brand-wide 1- or 2-digit range.

use crate::brand::{detect_brand, CardBrand};
use crate::country::{country_code, currency_for};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Longest prefix a table key may have
pub const MAX_PREFIX_LEN: usize = 8;

/// Placeholder for metadata nobody told us about
pub const UNKNOWN: &str = "Unknown";

// ============================================================================
// PROVENANCE
// ============================================================================

/// Where a classification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Static prefix table
    Local,

    /// External BIN lookup service
    Remote,

    /// Best-effort guess from the brand rules, not a validated fact
    Fallback,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Local => "local",
            Provenance::Remote => "remote",
            Provenance::Fallback => "fallback",
        }
    }
}

// ============================================================================
// BIN ENTRY
// ============================================================================

/// Issuer metadata for a BIN prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinEntry {
    /// Prefix this entry was resolved from
    pub prefix: String,

    pub brand: CardBrand,

    /// "credit", "debit", ... as reported by the source
    pub card_type: String,

    pub country: String,

    /// ISO 3166-1 alpha-2, "XX" when unknown
    pub country_code: String,

    pub bank: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub currency: String,

    pub provenance: Provenance,
}

impl BinEntry {
    /// Create a local entry; code and currency are derived from the country
    pub fn new(prefix: &str, brand: CardBrand, bank: &str, country: &str) -> Self {
        BinEntry {
            prefix: prefix.to_string(),
            brand,
            card_type: "credit".to_string(),
            country: country.to_string(),
            country_code: country_code(country).to_string(),
            bank: bank.to_string(),
            city: UNKNOWN.to_string(),
            state: UNKNOWN.to_string(),
            zip: UNKNOWN.to_string(),
            currency: currency_for(country).to_string(),
            provenance: Provenance::Local,
        }
    }

    /// Builder pattern: add city/state/zip
    pub fn with_location(mut self, city: &str, state: &str, zip: &str) -> Self {
        self.city = city.to_string();
        self.state = state.to_string();
        self.zip = zip.to_string();
        self
    }

    /// Builder pattern: override the derived currency
    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_string();
        self
    }

    /// Builder pattern: set the card type
    pub fn with_card_type(mut self, card_type: &str) -> Self {
        self.card_type = card_type.to_string();
        self
    }

    /// Builder pattern: change provenance
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }
}

// ============================================================================
// TABLE RECORD (file format)
// ============================================================================

/// One row of a table file (JSON array element or CSV row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinRecord {
    pub prefix: String,

    /// Brand name; detected from the prefix when absent
    #[serde(default)]
    pub brand: Option<String>,

    pub country: String,
    pub bank: String,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub zip: Option<String>,

    /// Derived from the country when absent
    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub card_type: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl BinRecord {
    pub fn into_entry(self) -> BinEntry {
        let brand = non_empty(&self.brand)
            .map(CardBrand::from_name)
            .filter(|b| *b != CardBrand::Unknown)
            .unwrap_or_else(|| detect_brand(&self.prefix));

        let mut entry = BinEntry::new(self.prefix.trim(), brand, self.bank.trim(), self.country.trim())
            .with_location(
                non_empty(&self.city).unwrap_or(UNKNOWN),
                non_empty(&self.state).unwrap_or(UNKNOWN),
                non_empty(&self.zip).unwrap_or(UNKNOWN),
            );

        if let Some(currency) = non_empty(&self.currency) {
            entry = entry.with_currency(currency);
        }
        if let Some(card_type) = non_empty(&self.card_type) {
            entry = entry.with_card_type(card_type);
        }

        entry
    }
}

// ============================================================================
// BIN TABLE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct BinTable {
    entries: HashMap<String, BinEntry>,
    max_prefix_len: usize,
}

impl BinTable {
    /// Create an empty table
    pub fn new() -> Self {
        BinTable::default()
    }

    /// Issuer-level BINs plus brand-wide ranges
    pub fn builtin() -> Self {
        let mut table = BinTable::issuers_only();
        for entry in brand_range_entries() {
            table.insert_unchecked(entry);
        }
        table
    }

    /// Only the bank-specific 6-digit BINs
    pub fn issuers_only() -> Self {
        let mut table = BinTable::new();
        for entry in issuer_entries() {
            table.insert_unchecked(entry);
        }
        table
    }

    /// Build from file records, rejecting malformed prefixes
    pub fn from_records(records: Vec<BinRecord>) -> Result<Self> {
        let mut table = BinTable::new();
        for record in records {
            table.insert(record.into_entry())?;
        }
        Ok(table)
    }

    /// Load from a JSON or CSV file (chosen by extension)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read BIN table file: {:?}", path))?;
                BinTable::from_json_str(&content)
            }
            "csv" => {
                let file = fs::File::open(path)
                    .with_context(|| format!("Failed to open BIN table file: {:?}", path))?;
                BinTable::from_csv_reader(file)
            }
            other => bail!("Unsupported BIN table format '{}': {:?}", other, path),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let records: Vec<BinRecord> =
            serde_json::from_str(content).context("Failed to parse BIN table JSON")?;
        BinTable::from_records(records)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: BinRecord = result.context("Failed to deserialize BIN record")?;
            records.push(record);
        }

        BinTable::from_records(records)
    }

    /// Add an entry, replacing any entry with the same prefix
    pub fn insert(&mut self, entry: BinEntry) -> Result<()> {
        let prefix = &entry.prefix;
        if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN {
            bail!(
                "BIN prefix must be 1-{} digits, got {} characters: {:?}",
                MAX_PREFIX_LEN,
                prefix.len(),
                prefix
            );
        }
        if !prefix.bytes().all(|b| b.is_ascii_digit()) {
            bail!("BIN prefix must contain only digits: {:?}", prefix);
        }

        self.insert_unchecked(entry);
        Ok(())
    }

    fn insert_unchecked(&mut self, entry: BinEntry) {
        self.max_prefix_len = self.max_prefix_len.max(entry.prefix.len());
        self.entries.insert(entry.prefix.clone(), entry);
    }

    /// Longest-prefix match over the leading digits.
    ///
    /// Candidate lengths run from the longest key (or the input length, if
    /// shorter) down to 1; each probe is a single hash lookup.
    pub fn lookup(&self, digits: &str) -> Option<&BinEntry> {
        let longest = self.max_prefix_len.min(digits.len());
        (1..=longest)
            .rev()
            .filter_map(|len| digits.get(..len))
            .find_map(|prefix| self.entries.get(prefix))
    }

    /// Exact key lookup
    pub fn get(&self, prefix: &str) -> Option<&BinEntry> {
        self.entries.get(prefix)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_prefix_len(&self) -> usize {
        self.max_prefix_len
    }
}

// ============================================================================
// BUILT-IN DATA
// ============================================================================

fn issuer(prefix: &str, bank: &str, country: &str, city: &str, state: &str, zip: &str) -> BinEntry {
    BinEntry::new(prefix, detect_brand(prefix), bank, country).with_location(city, state, zip)
}

fn issuer_entries() -> Vec<BinEntry> {
    vec![
        // Visa
        issuer("471632", "Bank of America", "United States", "New York", "NY", "10001"),
        issuer("411111", "Chase Bank", "United States", "Wilmington", "DE", "19801"),
        issuer("453211", "HSBC Bank", "United Kingdom", "London", "London", "EC2V 7HN"),
        issuer("455633", "Royal Bank of Canada", "Canada", "Toronto", "ON", "M5J 2T3"),
        issuer("491748", "Commonwealth Bank", "Australia", "Sydney", "NSW", "2000"),
        BinEntry::new("400000", CardBrand::Visa, "Chase Bank", "United States"),
        BinEntry::new("422222", CardBrand::Visa, "Barclays", "United Kingdom"),
        BinEntry::new("433333", CardBrand::Visa, "Royal Bank", "Canada"),
        BinEntry::new("444433", CardBrand::Visa, "Commonwealth Bank", "Australia"),
        // Mastercard
        issuer("511111", "Citibank", "United States", "Wilmington", "DE", "19801"),
        issuer("555555", "Mastercard Bank", "United States", "Wilmington", "DE", "19801"),
        issuer("542523", "Deutsche Bank", "Germany", "Berlin", "Berlin", "10117"),
        issuer("510000", "Capital One", "United States", "New York", "NY", "10001"),
        issuer("552742", "BNP Paribas", "France", "Paris", "Paris", "75008"),
        BinEntry::new("520000", CardBrand::Mastercard, "HSBC", "United Kingdom"),
        BinEntry::new("530000", CardBrand::Mastercard, "Deutsche Bank", "Germany"),
        BinEntry::new("540000", CardBrand::Mastercard, "BNP Paribas", "France"),
        BinEntry::new("550000", CardBrand::Mastercard, "Mitsubishi UFJ", "Japan"),
        // American Express
        issuer("371449", "American Express", "United States", "New York", "NY", "10004"),
        issuer("343434", "American Express", "United States", "New York", "NY", "10004"),
        issuer("376411", "American Express", "Mexico", "Mexico City", "CDMX", "11510"),
        // Discover
        issuer("601100", "Discover Bank", "United States", "Riverwoods", "IL", "60015"),
        issuer("601101", "Discover Bank", "United States", "Riverwoods", "IL", "60015"),
        // JCB
        issuer("353011", "JCB Co.", "Japan", "Tokyo", "Tokyo", "105-7117"),
        issuer("356999", "JCB International", "Japan", "Tokyo", "Tokyo", "105-7117"),
        // UnionPay
        issuer("625094", "China UnionPay", "China", "Beijing", "Beijing", "100031"),
        issuer("628888", "China UnionPay", "China", "Beijing", "Beijing", "100031"),
    ]
}

fn brand_range_entries() -> Vec<BinEntry> {
    let mut ranges = vec![BinEntry::new("4", CardBrand::Visa, "Visa", "International")];

    for prefix in ["51", "52", "53", "54", "55"] {
        ranges.push(BinEntry::new(prefix, CardBrand::Mastercard, "Mastercard", "International"));
    }

    ranges.extend([
        BinEntry::new("34", CardBrand::AmericanExpress, "American Express", "United States"),
        BinEntry::new("37", CardBrand::AmericanExpress, "American Express", "United States"),
        BinEntry::new("36", CardBrand::DinersClub, "Diners Club", "International"),
        BinEntry::new("6011", CardBrand::Discover, "Discover", "United States"),
        BinEntry::new("65", CardBrand::Discover, "Discover", "United States"),
        BinEntry::new("35", CardBrand::Jcb, "JCB", "Japan"),
        BinEntry::new("62", CardBrand::UnionPay, "UnionPay", "China"),
    ]);

    ranges
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_prefix_wins() {
        let table = BinTable::builtin();

        let entry = table.lookup("4111111111111111").unwrap();
        assert_eq!(entry.prefix, "411111");
        assert_eq!(entry.bank, "Chase Bank");
        assert_eq!(entry.city, "Wilmington");
        assert_eq!(entry.provenance, Provenance::Local);

        // Only the brand range matches here
        let generic = table.lookup("4999999999999999").unwrap();
        assert_eq!(generic.prefix, "4");
        assert_eq!(generic.bank, "Visa");
    }

    #[test]
    fn test_four_digit_beats_two_digit() {
        let mut table = BinTable::new();
        table.insert(BinEntry::new("60", CardBrand::Unknown, "Generic", "Unknown")).unwrap();
        table.insert(BinEntry::new("6011", CardBrand::Discover, "Discover", "United States")).unwrap();

        assert_eq!(table.lookup("6011000990139424").unwrap().prefix, "6011");
        assert_eq!(table.lookup("6022000000000000").unwrap().prefix, "60");
    }

    #[test]
    fn test_input_shorter_than_keys() {
        let table = BinTable::builtin();
        assert_eq!(table.lookup("41").unwrap().prefix, "4");
        assert_eq!(table.lookup("3").map(|e| e.prefix.as_str()), None);
        assert!(table.lookup("").is_none());
    }

    #[test]
    fn test_issuers_only_has_no_brand_ranges() {
        let table = BinTable::issuers_only();
        assert!(table.lookup("4999999999999999").is_none());
        assert_eq!(table.max_prefix_len(), 6);
        assert!(table.len() < BinTable::builtin().len());
    }

    #[test]
    fn test_entry_derives_country_metadata() {
        let table = BinTable::builtin();
        let entry = table.get("542523").unwrap();
        assert_eq!(entry.brand, CardBrand::Mastercard);
        assert_eq!(entry.country_code, "DE");
        assert_eq!(entry.currency, "EUR");

        let international = table.get("51").unwrap();
        assert_eq!(international.country_code, "XX");
    }

    #[test]
    fn test_insert_rejects_bad_prefix() {
        let mut table = BinTable::new();
        assert!(table.insert(BinEntry::new("", CardBrand::Visa, "x", "y")).is_err());
        assert!(table.insert(BinEntry::new("4a", CardBrand::Visa, "x", "y")).is_err());
        assert!(table.insert(BinEntry::new("123456789", CardBrand::Visa, "x", "y")).is_err());
        assert!(table.is_empty());

        table.insert(BinEntry::new("12345678", CardBrand::Unknown, "x", "y")).unwrap();
        assert_eq!(table.max_prefix_len(), 8);
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"[
            {"prefix": "424242", "country": "United States", "bank": "Test Bank", "city": "Austin", "state": "TX", "zip": "73301"},
            {"prefix": "9", "brand": "Diners Club", "country": "Nowhere", "bank": "Odd Bank", "currency": "ZZZ"}
        ]"#;

        let table = BinTable::from_json_str(json).unwrap();
        assert_eq!(table.len(), 2);

        let visa = table.get("424242").unwrap();
        assert_eq!(visa.brand, CardBrand::Visa);
        assert_eq!(visa.city, "Austin");
        assert_eq!(visa.currency, "USD");

        let odd = table.get("9").unwrap();
        assert_eq!(odd.brand, CardBrand::DinersClub);
        assert_eq!(odd.city, UNKNOWN);
        assert_eq!(odd.currency, "ZZZ");
    }

    #[test]
    fn test_from_csv_reader() {
        let csv = "prefix,brand,country,bank,city,state,zip,currency\n\
                   510510,,United States,CSV Bank,Chicago,IL,60601,\n\
                   35,JCB,Japan,JCB,,,,\n";

        let table = BinTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);

        let mc = table.lookup("5105105105105100").unwrap();
        assert_eq!(mc.brand, CardBrand::Mastercard);
        assert_eq!(mc.bank, "CSV Bank");
        assert_eq!(mc.currency, "USD");

        let jcb = table.get("35").unwrap();
        assert_eq!(jcb.city, UNKNOWN);
        assert_eq!(jcb.currency, "JPY");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(BinTable::from_json_str("{not json").is_err());
        assert!(BinTable::from_json_str(r#"[{"prefix": "x1", "country": "a", "bank": "b"}]"#).is_err());
    }

    #[test]
    fn test_from_file_unknown_extension() {
        assert!(BinTable::from_file("table.yaml").is_err());
    }

    #[test]
    fn test_provenance_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Provenance::Fallback).unwrap(), "\"fallback\"");
        assert_eq!(Provenance::Remote.as_str(), "remote");
    }
}
