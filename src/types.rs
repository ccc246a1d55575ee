use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tabled::Tabled;

#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Bank")]
    pub bank: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Distributor")]
    pub distributor: Option<String>,
    #[serde(rename = "dollars")]
    pub dollars: Option<String>,
}

/// One spend line as loaded from the source table. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub bank: String,
    /// "Month Year", e.g. "March 2024".
    pub month: String,
    pub year: i32,
    /// Distributor code as it appears in the data, e.g. "FACEBOOK.COM".
    pub platform: String,
    pub amount: u64,
}

/// Key of a monthly bucket. Ordering is chronological: year, then calendar
/// month (unrecognised names sort after December), then the label itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1..=12, or 13 when the month name is not recognised.
    pub ordinal: u32,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        };
        f.write_str(s)
    }
}

/// Every grouping of one bank's records. All maps sum to the same total.
#[derive(Debug, Clone, Default)]
pub struct BankSummary {
    pub bank: String,
    pub record_count: usize,
    pub yearly_totals: BTreeMap<i32, u64>,
    pub platform_totals: BTreeMap<String, u64>,
    pub monthly_totals: BTreeMap<MonthKey, u64>,
    pub platform_by_year: BTreeMap<i32, BTreeMap<String, u64>>,
    /// `None` when a month name could not be mapped to a quarter.
    pub quarterly_totals: Option<BTreeMap<(i32, Quarter), u64>>,
}

/// The years the insight rules talk about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periods {
    pub base: i32,
    pub target: i32,
    pub trailing: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight {
    pub rule: &'static str,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct BankReport {
    pub summary: BankSummary,
    pub insights: Vec<Insight>,
}

#[derive(Debug, Tabled, Clone)]
pub struct YearTotalRow {
    #[tabled(rename = "Year")]
    pub year: i32,
    #[tabled(rename = "Total")]
    pub total: String,
    #[tabled(rename = "YoY")]
    pub yoy: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct PlatformRow {
    #[tabled(rename = "Platform")]
    pub platform: String,
    #[tabled(rename = "Total")]
    pub total: String,
    #[tabled(rename = "Share")]
    pub share: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct PeakMonthRow {
    #[tabled(rename = "Year")]
    pub year: i32,
    #[tabled(rename = "PeakMonth")]
    pub month: String,
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[tabled(rename = "ShareOfYear")]
    pub share_of_year: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct QuarterRow {
    #[tabled(rename = "Year")]
    pub year: i32,
    #[tabled(rename = "Quarter")]
    pub quarter: Quarter,
    #[tabled(rename = "Total")]
    pub total: String,
}

/// Export view of one bank: insights split into two labelled periods.
#[derive(Debug, Serialize)]
pub struct BankExport {
    #[serde(flatten)]
    pub periods: BTreeMap<String, Vec<String>>,
}
