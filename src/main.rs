// Entry point and pipeline wiring.
//
// Loader -> Aggregator -> Insight Generator -> Reporter, in one pass:
// - load the spend table named on the command line,
// - group it per bank and derive the insight sentences,
// - print the report to stdout and optionally export the JSON summary.
mod cli;
mod error;
mod insights;
mod loader;
mod output;
mod overview;
mod platform;
mod reports;
mod types;
mod util;


use clap::Parser;
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, ReportConfig};
use error::Result;
use output::DisplayOptions;
use types::{BankReport, Record};

/// Everything the reporter needs, derived from the loaded records.
struct Analysis {
    periods: types::Periods,
    overview: overview::MarketOverview,
    banks: BTreeMap<String, BankReport>,
}

fn analyze(records: &[Record], config: &ReportConfig) -> Result<Option<Analysis>> {
    let Some(periods) =
        reports::resolve_periods(records, config.target_year, config.trailing_year)
    else {
        return Ok(None);
    };
    let summaries = reports::aggregate(records)?;
    let overview = overview::market_overview(records, &summaries, &periods);
    let banks = summaries
        .into_iter()
        .map(|(bank, summary)| {
            let insights = insights::generate(&summary, &periods);
            (bank, BankReport { summary, insights })
        })
        .collect();
    Ok(Some(Analysis {
        periods,
        overview,
        banks,
    }))
}

/// Run the whole pipeline, writing the display report to `out`.
///
/// The display report is always written before the export is attempted,
/// so an export failure still leaves a complete report on `out`.
fn run<W: Write>(config: &ReportConfig, out: &mut W) -> Result<()> {
    let (mut records, load_report) = loader::load_path(&config.input)?;
    info!(
        rows = %util::format_int(load_report.total_rows),
        banks = load_report.banks,
        defaulted = load_report.defaulted_fields,
        "dataset loaded"
    );

    if !config.banks.is_empty() {
        records.retain(|r| config.includes_bank(&r.bank));
        if records.is_empty() {
            warn!(banks = ?config.banks, "bank filter matched no records");
        }
    }

    let Some(analysis) = analyze(&records, config)? else {
        writeln!(out, "No records to report.")?;
        return Ok(());
    };
    for (bank, report) in &analysis.banks {
        let rules: Vec<&str> = report.insights.iter().map(|i| i.rule).collect();
        debug!(bank = %bank, ?rules, "insights generated");
    }

    output::render_report(
        out,
        &analysis.overview,
        &analysis.banks,
        &analysis.periods,
        DisplayOptions {
            tables: config.tables,
        },
    )?;
    out.flush()?;

    if let Some(path) = &config.export {
        let view = output::export_view(&analysis.banks, &analysis.periods);
        output::write_json(path, &view)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(io::stderr))
        .init();

    let config = ReportConfig::from(&cli);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&config, &mut out)
}
