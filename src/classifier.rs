// 🏷️ BIN Classifier - table → cache → remote → fallback
//
// One configurable classifier instead of a service object per caller:
// - table_only():  static prefix table + fallback
// - with_remote(): static prefix table + cached remote lookup + fallback
//
// classify() always returns an entry. Remote failures are logged and
// swallowed; the caller only ever sees the provenance tag change.

use crate::bin_table::{BinEntry, BinTable, Provenance, UNKNOWN};
use crate::brand::{detect_brand, CardBrand};
use crate::cache::{BinCache, CacheStats};
use crate::remote::RemoteLookup;
use std::sync::Arc;
use tracing::{debug, warn};

/// Digits a remote lookup is keyed by
pub const REMOTE_BIN_LEN: usize = 6;

pub struct BinClassifier {
    table: Arc<BinTable>,
    remote: Option<Arc<dyn RemoteLookup>>,
    cache: BinCache,
}

impl BinClassifier {
    /// Static table only; misses go straight to the fallback policy
    pub fn table_only(table: BinTable) -> Self {
        BinClassifier {
            table: Arc::new(table),
            remote: None,
            cache: BinCache::new(),
        }
    }

    /// Static table first, then the remote backend (cached), then fallback
    pub fn with_remote(table: BinTable, remote: Arc<dyn RemoteLookup>) -> Self {
        BinClassifier {
            table: Arc::new(table),
            remote: Some(remote),
            cache: BinCache::new(),
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn table(&self) -> &BinTable {
        &self.table
    }

    /// Resolve issuer metadata for a card number or prefix. Never fails.
    pub fn classify(&self, card_number_prefix: &str) -> BinEntry {
        let digits = leading_digits(card_number_prefix);

        if let Some(entry) = self.table.lookup(&digits) {
            debug!(prefix = %entry.prefix, "BIN resolved from local table");
            return entry.clone();
        }

        if let Some(entry) = self.lookup_remote(&digits) {
            return entry;
        }

        debug!(bin = %bin_of(&digits), "BIN unresolved, using fallback");
        fallback_entry(&digits)
    }

    fn lookup_remote(&self, digits: &str) -> Option<BinEntry> {
        let remote = self.remote.as_ref()?;
        if digits.len() < REMOTE_BIN_LEN {
            return None;
        }
        let bin = &digits[..REMOTE_BIN_LEN];

        if let Some(cached) = self.cache.get(bin) {
            debug!(bin, "BIN resolved from cache");
            return Some(cached);
        }

        match remote.lookup(bin) {
            Ok(entry) => {
                let entry = entry.with_provenance(Provenance::Remote);
                self.cache.insert(bin, entry.clone());
                debug!(bin, backend = remote.name(), "BIN resolved remotely");
                Some(entry)
            }
            Err(err) => {
                warn!(bin, backend = remote.name(), error = %err, "BIN lookup failed, falling back");
                None
            }
        }
    }

    /// Drop every cached remote answer
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            size: self.cache.len(),
            table_size: self.table.len(),
        }
    }
}

impl Default for BinClassifier {
    fn default() -> Self {
        BinClassifier::table_only(BinTable::builtin())
    }
}

/// Leading run of ASCII digits, whitespace ignored
fn leading_digits(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .take_while(|c| c.is_ascii_digit())
        .collect()
}

fn bin_of(digits: &str) -> &str {
    digits.get(..REMOTE_BIN_LEN).unwrap_or(digits)
}

// ============================================================================
// FALLBACK POLICY
// ============================================================================

/// Placeholder metadata keyed by the rule-detected brand.
///
/// A guess, not a fact: always tagged `Provenance::Fallback`.
pub fn fallback_entry(digits: &str) -> BinEntry {
    let brand = detect_brand(digits);
    const VARIOUS: (&str, &str, &str) = ("Various Cities", "Various States", "Various");

    let (bank, country, (city, state, zip)) = match brand {
        CardBrand::Visa => ("Visa Member Bank", "United States", VARIOUS),
        CardBrand::Mastercard => ("Mastercard Member Bank", "United States", VARIOUS),
        CardBrand::AmericanExpress => ("American Express", "United States", ("New York", "NY", "10004")),
        CardBrand::Discover => ("Discover Bank", "United States", ("Riverwoods", "IL", "60015")),
        CardBrand::Jcb => ("JCB Member Bank", "Japan", VARIOUS),
        CardBrand::UnionPay => ("UnionPay Member Bank", "China", VARIOUS),
        CardBrand::DinersClub => ("Diners Club Member Bank", "United States", VARIOUS),
        CardBrand::Unknown => ("Unknown Bank", UNKNOWN, (UNKNOWN, UNKNOWN, UNKNOWN)),
    };

    BinEntry::new(bin_of(digits), brand, bank, country)
        .with_location(city, state, zip)
        .with_provenance(Provenance::Fallback)
}

// ============================================================================
// TESTS
// ============================================================================
