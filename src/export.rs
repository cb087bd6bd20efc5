// 📤 Report Sinks - where finished reports go
//
// Presentation lives behind ReportSink: the core produces CardReports,
// a sink renders or stores them. CSV, JSON lines and the running summary
// are the sinks shipped here.

use crate::report::{BatchSummary, CardReport};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

/// ReportSink - consumer of card reports
pub trait ReportSink {
    fn write_report(&mut self, report: &CardReport) -> Result<()>;

    /// Flush anything buffered
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_all(&mut self, reports: &[CardReport]) -> Result<()> {
        for report in reports {
            self.write_report(report)?;
        }
        self.finish()
    }
}

// ============================================================================
// CSV
// ============================================================================

/// Flat CSV row
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Card Number")]
    number: &'a str,

    #[serde(rename = "Status")]
    status: &'a str,

    #[serde(rename = "Reason")]
    reason: &'a str,

    #[serde(rename = "Brand")]
    brand: &'a str,

    #[serde(rename = "Bank")]
    bank: &'a str,

    #[serde(rename = "Country")]
    country: &'a str,

    #[serde(rename = "Country Code")]
    country_code: &'a str,

    #[serde(rename = "City")]
    city: &'a str,

    #[serde(rename = "State")]
    state: &'a str,

    #[serde(rename = "Zip")]
    zip: &'a str,

    #[serde(rename = "Currency")]
    currency: &'a str,

    #[serde(rename = "Source")]
    source: &'a str,

    #[serde(rename = "Checked At")]
    checked_at: String,
}

pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        CsvSink {
            writer: csv::Writer::from_writer(inner),
        }
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV export: {}", e.error()))
    }
}

impl<W: Write> ReportSink for CsvSink<W> {
    fn write_report(&mut self, report: &CardReport) -> Result<()> {
        let issuer = &report.issuer;
        let row = CsvRow {
            number: &report.number,
            status: report.status(),
            reason: report.reason().map(|r| r.as_str()).unwrap_or(""),
            brand: issuer.brand.as_str(),
            bank: &issuer.bank,
            country: &issuer.country,
            country_code: &issuer.country_code,
            city: &issuer.city,
            state: &issuer.state,
            zip: &issuer.zip,
            currency: &issuer.currency,
            source: issuer.provenance.as_str(),
            checked_at: report.checked_at.to_rfc3339(),
        };

        self.writer
            .serialize(row)
            .context("Failed to write CSV row")
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush CSV export")
    }
}

// ============================================================================
// JSON LINES
// ============================================================================

pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonLinesSink<W> {
    fn write_report(&mut self, report: &CardReport) -> Result<()> {
        serde_json::to_writer(&mut self.writer, report).context("Failed to serialize report")?;
        self.writer.write_all(b"\n").context("Failed to write report")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush JSON export")
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

impl ReportSink for BatchSummary {
    fn write_report(&mut self, report: &CardReport) -> Result<()> {
        self.record(report);
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::BinClassifier;
    use crate::report::{check_many, SAMPLE_CARDS};

    fn sample_reports() -> Vec<CardReport> {
        check_many(&BinClassifier::default(), SAMPLE_CARDS, 100)
    }

    #[test]
    fn test_csv_export() {
        let mut sink = CsvSink::new(Vec::new());
        sink.write_all(&sample_reports()).unwrap();

        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(
            lines[0],
            "Card Number,Status,Reason,Brand,Bank,Country,Country Code,City,State,Zip,Currency,Source,Checked At"
        );
        assert!(lines[1].starts_with("4716 3254 2797 5915,VALID,,Visa,Bank of America,United States,US,New York,NY,10001,USD,local,"));
        assert!(lines[5].starts_with("1234 5678 9012 3456,INVALID,Failed checksum,Unknown,Unknown Bank,"));
        assert!(lines[5].contains(",fallback,"));
    }

    #[test]
    fn test_json_lines_export() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write_all(&sample_reports()).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let parsed: Vec<CardReport> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(parsed.len(), 6);
        assert_eq!(parsed[2].issuer.bank, "American Express");
        assert!(output.contains("\"provenance\":\"local\""));
    }

    #[test]
    fn test_summary_sink() {
        let mut summary = BatchSummary::default();
        summary.write_all(&sample_reports()).unwrap();
        assert_eq!(summary.total, 6);
        assert_eq!(summary.invalid, 1);
    }
}
