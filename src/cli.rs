//! Command-line arguments and the report configuration derived from them.

use std::path::PathBuf;

use clap::Parser;

/// Aggregate bank advertising spend and print templated insights
#[derive(Parser, Debug)]
#[command(name = "bank-insights", version, about, long_about = None)]
pub struct Cli {
    /// Spend table with Bank, Month, Year, Distributor and dollars columns
    #[arg(short, long, default_value = "banking-social-data.csv")]
    pub input: PathBuf,

    /// Write a JSON summary of the insights to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Complete year the insights focus on (default: derived from the data)
    #[arg(long)]
    pub target_year: Option<i32>,

    /// Later, partial year used for pace commentary
    #[arg(long)]
    pub trailing_year: Option<i32>,

    /// Only report on these banks (repeatable, case-insensitive)
    #[arg(short, long = "bank")]
    pub banks: Vec<String>,

    /// Print insights only, without the statistics tables
    #[arg(long)]
    pub no_tables: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub input: PathBuf,
    pub export: Option<PathBuf>,
    pub target_year: Option<i32>,
    pub trailing_year: Option<i32>,
    pub banks: Vec<String>,
    pub tables: bool,
}

impl From<&Cli> for ReportConfig {
    fn from(cli: &Cli) -> Self {
        ReportConfig {
            input: cli.input.clone(),
            export: cli.output.clone(),
            target_year: cli.target_year,
            trailing_year: cli.trailing_year,
            banks: cli.banks.clone(),
            tables: !cli.no_tables,
        }
    }
}

impl ReportConfig {
    pub fn includes_bank(&self, bank: &str) -> bool {
        self.banks.is_empty() || self.banks.iter().any(|b| b.eq_ignore_ascii_case(bank))
    }
}
