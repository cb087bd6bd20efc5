// ⚙️ Configuration - environment first, JSON file optional

use crate::bin_table::BinTable;
use crate::classifier::BinClassifier;
use crate::remote::{RemoteLookup, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_MS};
use crate::report::DEFAULT_BATCH_LIMIT;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Ask the remote service when the table misses
    pub remote_enabled: bool,

    pub remote_endpoint: String,
    pub remote_timeout_ms: u64,

    /// Cards per batch
    pub batch_limit: usize,

    /// JSON/CSV table replacing the built-in one
    pub table_path: Option<PathBuf>,

    /// Add brand-wide ranges (4, 51-55, ...) to the built-in table.
    /// Unset means: only when remote lookup is off, so the ranges never
    /// answer for a BIN the remote service could resolve.
    pub include_brand_ranges: Option<bool>,

    /// HTTP port for the API server
    pub port: u16,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            remote_enabled: false,
            remote_endpoint: DEFAULT_ENDPOINT.to_string(),
            remote_timeout_ms: DEFAULT_TIMEOUT_MS,
            batch_limit: DEFAULT_BATCH_LIMIT,
            table_path: None,
            include_brand_ranges: None,
            port: 3000,
        }
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(anyhow!("{name} must be 'true' or 'false', got '{other}'")),
    }
}

impl CheckerConfig {
    /// Read from process environment, defaults for anything unset
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read from any key → value source
    pub fn from_vars<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = CheckerConfig::default();

        if let Some(value) = get("CARD_CHECKER_REMOTE") {
            config.remote_enabled = parse_bool("CARD_CHECKER_REMOTE", &value)?;
        }
        if let Some(value) = get("CARD_CHECKER_BIN_ENDPOINT") {
            config.remote_endpoint = value;
        }
        if let Some(value) = get("CARD_CHECKER_REMOTE_TIMEOUT_MS") {
            config.remote_timeout_ms = value
                .trim()
                .parse()
                .context("CARD_CHECKER_REMOTE_TIMEOUT_MS must be a valid u64 integer")?;
        }
        if let Some(value) = get("CARD_CHECKER_BATCH_LIMIT") {
            config.batch_limit = value
                .trim()
                .parse()
                .context("CARD_CHECKER_BATCH_LIMIT must be a valid integer")?;
        }
        if let Some(value) = get("CARD_CHECKER_BIN_TABLE") {
            config.table_path = Some(PathBuf::from(value));
        }
        if let Some(value) = get("CARD_CHECKER_BRAND_RANGES") {
            config.include_brand_ranges = Some(parse_bool("CARD_CHECKER_BRAND_RANGES", &value)?);
        }
        if let Some(value) = get("PORT") {
            config.port = value
                .trim()
                .parse::<u16>()
                .context("PORT must be a valid u16 integer")?;
        }

        Ok(config)
    }

    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Whether the built-in table carries the brand-wide ranges
    pub fn brand_ranges_enabled(&self) -> bool {
        self.include_brand_ranges.unwrap_or(!self.remote_enabled)
    }

    /// Table named by the config, or the built-in one
    pub fn load_table(&self) -> Result<BinTable> {
        match &self.table_path {
            Some(path) => BinTable::from_file(path),
            None if self.brand_ranges_enabled() => Ok(BinTable::builtin()),
            None => Ok(BinTable::issuers_only()),
        }
    }

    /// Same table selection as `build_classifier`; the backend is used only
    /// when remote lookup is enabled
    pub fn build_classifier_with(&self, remote: Arc<dyn RemoteLookup>) -> Result<BinClassifier> {
        let table = self.load_table()?;
        info!(entries = table.len(), backend = remote.name(), "BIN table loaded");

        if !self.remote_enabled {
            return Ok(BinClassifier::table_only(table));
        }

        Ok(BinClassifier::with_remote(table, remote))
    }

    /// Assemble the classifier this config describes
    pub fn build_classifier(&self) -> Result<BinClassifier> {
        let table = self.load_table()?;
        info!(entries = table.len(), remote = self.remote_enabled, "BIN table loaded");

        if self.remote_enabled {
            return self.with_remote(table);
        }

        Ok(BinClassifier::table_only(table))
    }

    #[cfg(feature = "remote")]
    fn with_remote(&self, table: BinTable) -> Result<BinClassifier> {
        use crate::remote::BinlistClient;

        let client = BinlistClient::new(&self.remote_endpoint, self.remote_timeout_ms)
            .context("Failed to build BIN lookup client")?;
        info!(endpoint = client.endpoint(), timeout_ms = self.remote_timeout_ms, "remote BIN lookup enabled");

        Ok(BinClassifier::with_remote(table, Arc::new(client)))
    }

    #[cfg(not(feature = "remote"))]
    fn with_remote(&self, table: BinTable) -> Result<BinClassifier> {
        tracing::warn!("remote BIN lookup requested but the 'remote' feature is disabled");
        Ok(BinClassifier::table_only(table))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bin_table::{BinEntry, Provenance};
    use crate::brand::detect_brand;
    use crate::remote::LookupError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and answers every BIN
    struct CountingRemote {
        calls: AtomicUsize,
    }

    impl RemoteLookup for CountingRemote {
        fn lookup(&self, bin: &str) -> Result<BinEntry, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(BinEntry::new(bin, detect_brand(bin), "Jyske Bank", "Denmark"))
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CheckerConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, CheckerConfig::default());
        assert!(!config.remote_enabled);
        assert_eq!(config.remote_timeout_ms, 5000);
        assert_eq!(config.batch_limit, 100);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_overrides() {
        let config = CheckerConfig::from_vars(vars(&[
            ("CARD_CHECKER_REMOTE", "true"),
            ("CARD_CHECKER_BIN_ENDPOINT", "http://localhost:9000"),
            ("CARD_CHECKER_REMOTE_TIMEOUT_MS", "250"),
            ("CARD_CHECKER_BATCH_LIMIT", "10"),
            ("CARD_CHECKER_BRAND_RANGES", "false"),
            ("PORT", "8080"),
        ]))
        .unwrap();

        assert!(config.remote_enabled);
        assert_eq!(config.remote_endpoint, "http://localhost:9000");
        assert_eq!(config.remote_timeout_ms, 250);
        assert_eq!(config.batch_limit, 10);
        assert_eq!(config.include_brand_ranges, Some(false));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_brand_ranges_follow_remote_mode() {
        let local = CheckerConfig::default();
        assert!(local.brand_ranges_enabled());

        let remote = CheckerConfig::from_vars(vars(&[("CARD_CHECKER_REMOTE", "true")])).unwrap();
        assert_eq!(remote.include_brand_ranges, None);
        assert!(!remote.brand_ranges_enabled());
        assert_eq!(remote.load_table().unwrap().len(), BinTable::issuers_only().len());

        let forced = CheckerConfig::from_vars(vars(&[
            ("CARD_CHECKER_REMOTE", "true"),
            ("CARD_CHECKER_BRAND_RANGES", "true"),
        ]))
        .unwrap();
        assert!(forced.brand_ranges_enabled());
        assert_eq!(forced.load_table().unwrap().len(), BinTable::builtin().len());
    }

    #[test]
    fn test_remote_mode_reaches_backend() {
        let config = CheckerConfig::from_vars(vars(&[("CARD_CHECKER_REMOTE", "true")])).unwrap();
        let remote = Arc::new(CountingRemote { calls: AtomicUsize::new(0) });

        let classifier = config.build_classifier_with(remote.clone()).unwrap();
        assert!(classifier.has_remote());

        let entry = classifier.classify("4571731234567890");
        assert_eq!(entry.provenance, Provenance::Remote);
        assert_eq!(entry.bank, "Jyske Bank");
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);

        // Known issuer BINs still answer locally
        assert_eq!(classifier.classify("4111111111111111").provenance, Provenance::Local);
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_forced_brand_ranges_shadow_backend() {
        let config = CheckerConfig {
            remote_enabled: true,
            include_brand_ranges: Some(true),
            ..CheckerConfig::default()
        };
        let remote = Arc::new(CountingRemote { calls: AtomicUsize::new(0) });

        let classifier = config.build_classifier_with(remote.clone()).unwrap();
        assert_eq!(classifier.classify("4571731234567890").provenance, Provenance::Local);
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_values() {
        assert!(CheckerConfig::from_vars(vars(&[("CARD_CHECKER_REMOTE", "yes")])).is_err());
        assert!(CheckerConfig::from_vars(vars(&[("PORT", "99999")])).is_err());
        assert!(CheckerConfig::from_vars(vars(&[("CARD_CHECKER_BATCH_LIMIT", "-1")])).is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: CheckerConfig =
            serde_json::from_str(r#"{"batch_limit": 25, "remote_enabled": true}"#).unwrap();
        assert_eq!(config.batch_limit, 25);
        assert!(config.remote_enabled);
        assert_eq!(config.remote_endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_build_table_only_classifier() {
        let config = CheckerConfig {
            include_brand_ranges: Some(false),
            ..CheckerConfig::default()
        };

        let classifier = config.build_classifier().unwrap();
        assert!(!classifier.has_remote());
        assert_eq!(classifier.table().len(), BinTable::issuers_only().len());
    }

    #[test]
    fn test_table_from_file() {
        let path = std::env::temp_dir().join(format!("card-checker-table-{}.json", std::process::id()));
        fs::write(&path, r#"[{"prefix": "777777", "country": "Canada", "bank": "File Bank"}]"#).unwrap();

        let config = CheckerConfig {
            table_path: Some(path.clone()),
            ..CheckerConfig::default()
        };
        let classifier = config.build_classifier().unwrap();
        assert_eq!(classifier.classify("7777771234567890").bank, "File Bank");

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_table_file() {
        let config = CheckerConfig {
            table_path: Some(PathBuf::from("/nonexistent/table.json")),
            ..CheckerConfig::default()
        };
        assert!(config.build_classifier().is_err());
    }
}
