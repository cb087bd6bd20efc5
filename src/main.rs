use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io;
use std::path::Path;

use card_checker::logging::init_tracing;
use card_checker::{
    check_batch, check_many, BatchSummary, BinClassifier, CardReport, CheckerConfig, CsvSink,
    JsonLinesSink, ReportSink, SAMPLE_CARDS,
};

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = CheckerConfig::from_env()?;

    match args.first().map(String::as_str) {
        Some("check") => {
            let classifier = config.build_classifier()?;
            run_check(&classifier, &config, &args[1..])
        }
        Some("batch") => {
            let classifier = config.build_classifier()?;
            run_batch(&classifier, &config, &args[1..])
        }
        Some("bin") => {
            let classifier = config.build_classifier()?;
            run_bin(&classifier, &args[1..])
        }
        Some("sample") => {
            let classifier = config.build_classifier()?;
            run_check(&classifier, &config, SAMPLE_CARDS)
        }
        Some("help") | Some("--help") | Some("-h") | None => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            print_usage();
            bail!("Unknown command: {}", other)
        }
    }
}

fn print_usage() {
    println!("💳 card-checker {}", card_checker::VERSION);
    println!();
    println!("Usage:");
    println!("  card-checker check <number>...             Validate and classify cards");
    println!("  card-checker batch <file> [--csv <out>] [--json]");
    println!("                                             One card per line");
    println!("  card-checker bin <prefix>                  Issuer lookup only");
    println!("  card-checker sample                        Check the built-in sample cards");
    println!();
    println!("Environment: CARD_CHECKER_REMOTE, CARD_CHECKER_BIN_ENDPOINT,");
    println!("             CARD_CHECKER_REMOTE_TIMEOUT_MS, CARD_CHECKER_BATCH_LIMIT,");
    println!("             CARD_CHECKER_BIN_TABLE, CARD_CHECKER_BRAND_RANGES, RUST_LOG");
}

fn print_report(report: &CardReport) {
    let mark = if report.is_valid() { "✅" } else { "❌" };
    let issuer = &report.issuer;

    println!(
        "{} {:<24} {:<8} Type: {:<17} Country: {:<15} Bank: {} [{}]",
        mark,
        report.number,
        report.status(),
        issuer.brand,
        issuer.country,
        issuer.bank,
        issuer.provenance.as_str()
    );

    if let Some(reason) = report.reason() {
        println!("   └─ {}", reason);
    }
}

fn print_summary(summary: &BatchSummary) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📊 {}", summary.summary());
}

fn run_check<S: AsRef<str> + Sync>(
    classifier: &BinClassifier,
    config: &CheckerConfig,
    cards: &[S],
) -> Result<()> {
    if cards.is_empty() {
        bail!("Please enter at least one credit card number.");
    }

    let reports = check_many(classifier, cards, config.batch_limit);
    let mut summary = BatchSummary::default();
    for report in &reports {
        print_report(report);
        summary.write_report(report)?;
    }
    print_summary(&summary);

    Ok(())
}

fn run_batch(classifier: &BinClassifier, config: &CheckerConfig, args: &[String]) -> Result<()> {
    let Some(input_path) = args.first() else {
        bail!("batch needs an input file");
    };

    let mut csv_out: Option<&str> = None;
    let mut json = false;
    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--csv" => {
                csv_out = Some(rest.next().context("--csv needs an output path")?.as_str());
            }
            "--json" => json = true,
            other => bail!("Unknown batch option: {}", other),
        }
    }

    let input = fs::read_to_string(Path::new(input_path))
        .with_context(|| format!("Failed to read card file: {}", input_path))?;

    let reports = check_batch(classifier, &input, config.batch_limit);
    if reports.is_empty() {
        bail!("Please enter credit card numbers to check.");
    }

    if json {
        let stdout = io::stdout();
        JsonLinesSink::new(stdout.lock()).write_all(&reports)?;
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    if let Some(path) = csv_out {
        let file = fs::File::create(path)
            .with_context(|| format!("Failed to create CSV export: {}", path))?;
        let mut sink = CsvSink::new(file);
        sink.write_all(&reports)?;
        if !json {
            println!("💾 Exported {} results to {}", reports.len(), path);
        }
    }

    if !json {
        print_summary(&BatchSummary::from_reports(&reports));
    }

    Ok(())
}

fn run_bin(classifier: &BinClassifier, args: &[String]) -> Result<()> {
    let Some(prefix) = args.first() else {
        bail!("bin needs a prefix");
    };

    let entry = classifier.classify(prefix);
    println!("{}", serde_json::to_string_pretty(&entry)?);

    Ok(())
}
