// Card Checker - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod validator;  // Length window + Luhn checksum
pub mod brand;      // Rule-driven brand detection
pub mod country;    // Country code / currency lookup
pub mod bin_table;  // Static prefix table, longest-prefix match
pub mod remote;     // Optional remote BIN lookup
pub mod cache;      // Remote answer cache
pub mod classifier; // Table → cache → remote → fallback
pub mod report;     // Per-card reports, batches, summaries
pub mod export;     // Report sinks (CSV, JSON lines)
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use validator::{
    validate, luhn_valid, normalize,
    CardNumber, InvalidReason, ValidationOutcome,
    MIN_CARD_LENGTH, MAX_CARD_LENGTH,
};
pub use brand::{detect_brand, CardBrand};
pub use bin_table::{BinEntry, BinRecord, BinTable, Provenance};
pub use remote::{LookupError, RemoteLookup};
#[cfg(feature = "remote")]
pub use remote::BinlistClient;
pub use cache::{BinCache, CacheStats};
pub use classifier::{fallback_entry, BinClassifier};
pub use report::{
    check_batch, check_card, check_many,
    BatchSummary, CardReport, DEFAULT_BATCH_LIMIT, SAMPLE_CARDS,
};
pub use export::{CsvSink, JsonLinesSink, ReportSink};
pub use config::CheckerConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
