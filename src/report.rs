// 📋 Card Reports - validation + classification combined per card
//
// A report is recomputed on every call and never stored. Batches are just
// independent checks run in parallel; output order matches input order.

use crate::bin_table::BinEntry;
use crate::brand::CardBrand;
use crate::classifier::BinClassifier;
use crate::validator::{format_digits, validate, CardNumber, InvalidReason, ValidationOutcome};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Most cards checked in one batch unless configured otherwise
pub const DEFAULT_BATCH_LIMIT: usize = 100;

/// Known test numbers: five pass, one fails the checksum
pub const SAMPLE_CARDS: &[&str] = &[
    "4716325427975915",
    "5111111111111118",
    "371449635398431",
    "4111111111111111",
    "1234567890123456",
    "5555555555554444",
];

// ============================================================================
// CARD REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardReport {
    /// Normalized number grouped in fours for display
    pub number: String,

    pub validation: ValidationOutcome,

    /// Issuer metadata, resolved whether or not the number is valid
    pub issuer: BinEntry,

    pub checked_at: DateTime<Utc>,
}

impl CardReport {
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }

    pub fn reason(&self) -> Option<InvalidReason> {
        self.validation.failure()
    }

    pub fn status(&self) -> &'static str {
        if self.is_valid() {
            "VALID"
        } else {
            "INVALID"
        }
    }
}

/// Validate and classify one raw card number
pub fn check_card(classifier: &BinClassifier, raw: &str) -> CardReport {
    let validation = validate(raw);
    let issuer = classifier.classify(&validation.normalized);

    // Malformed input is still echoed back, grouped the same way
    let number = CardNumber::parse(&validation.normalized)
        .map(|card| card.formatted())
        .unwrap_or_else(|| format_digits(&validation.normalized));

    CardReport {
        number,
        validation,
        issuer,
        checked_at: Utc::now(),
    }
}

/// Non-blank lines of a multi-line input, trimmed
pub fn split_batch_input(input: &str) -> Vec<&str> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Check up to `limit` cards (one per line) in parallel, preserving order
pub fn check_batch(classifier: &BinClassifier, input: &str, limit: usize) -> Vec<CardReport> {
    let cards = split_batch_input(input);
    check_many(classifier, &cards, limit)
}

/// Same as [`check_batch`] for an already-split list
pub fn check_many<S: AsRef<str> + Sync>(
    classifier: &BinClassifier,
    cards: &[S],
    limit: usize,
) -> Vec<CardReport> {
    if cards.len() > limit {
        tracing::info!(submitted = cards.len(), limit, "batch truncated");
    }

    cards
        .par_iter()
        .take(limit)
        .map(|card| check_card(classifier, card.as_ref()))
        .collect()
}

// ============================================================================
// BATCH SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub by_brand: BTreeMap<CardBrand, usize>,
}

impl BatchSummary {
    pub fn from_reports(reports: &[CardReport]) -> Self {
        let mut summary = BatchSummary::default();
        for report in reports {
            summary.record(report);
        }
        summary
    }

    pub fn record(&mut self, report: &CardReport) {
        self.total += 1;
        if report.is_valid() {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }
        *self.by_brand.entry(report.issuer.brand).or_insert(0) += 1;
    }

    pub fn brand_count(&self, brand: CardBrand) -> usize {
        self.by_brand.get(&brand).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        format!(
            "Checked: {}, Valid: {}, Invalid: {}, Visa: {}, Mastercard: {}",
            self.total,
            self.valid,
            self.invalid,
            self.brand_count(CardBrand::Visa),
            self.brand_count(CardBrand::Mastercard)
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
