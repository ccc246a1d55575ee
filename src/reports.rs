use crate::error::{ReportError, Result};
use crate::types::{BankSummary, MonthKey, Periods, Record};
use crate::util::{month_ordinal, quarter};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

const UNKNOWN_MONTH_ORDINAL: u32 = 13;

/// Partition records by bank and fold each partition into a summary.
pub fn aggregate(records: &[Record]) -> Result<BTreeMap<String, BankSummary>> {
    let mut by_bank: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for r in records {
        by_bank.entry(r.bank.as_str()).or_default().push(r);
    }
    by_bank
        .into_iter()
        .map(|(bank, rows)| summarize_bank(bank, &rows).map(|s| (bank.to_string(), s)))
        .collect()
}

pub fn summarize_bank(bank: &str, rows: &[&Record]) -> Result<BankSummary> {
    let mut summary = BankSummary {
        bank: bank.to_string(),
        record_count: rows.len(),
        ..BankSummary::default()
    };
    let mut quarterly = Some(BTreeMap::new());
    let mut bank_total = 0u64;

    for r in rows {
        // Every bucket below is a partial sum of `bank_total`, so once this
        // add succeeds none of them can overflow.
        bank_total = bank_total
            .checked_add(r.amount)
            .ok_or_else(|| ReportError::AmountOverflow {
                bank: bank.to_string(),
                year: r.year,
            })?;
        *summary.yearly_totals.entry(r.year).or_insert(0) += r.amount;
        *summary.platform_totals.entry(r.platform.clone()).or_insert(0) += r.amount;
        let key = MonthKey {
            year: r.year,
            ordinal: month_ordinal(&r.month).unwrap_or(UNKNOWN_MONTH_ORDINAL),
            label: r.month.clone(),
        };
        *summary.monthly_totals.entry(key).or_insert(0) += r.amount;
        *summary
            .platform_by_year
            .entry(r.year)
            .or_default()
            .entry(r.platform.clone())
            .or_insert(0) += r.amount;

        if let Some(q_totals) = quarterly.as_mut() {
            match quarter(&r.month) {
                Ok(q) => *q_totals.entry((r.year, q)).or_insert(0) += r.amount,
                Err(e) => {
                    warn!(bank, year = r.year, error = %e, "quarterly totals unavailable for bank");
                    quarterly = None;
                }
            }
        }
    }

    summary.quarterly_totals = quarterly;
    Ok(summary)
}

/// Resolve which years the insight rules compare.
///
/// Without overrides, the latest year in the dataset is the trailing
/// (partial) year when fewer than 12 distinct months of it were observed,
/// and the year before it becomes the target; otherwise the latest year is
/// the target. An explicit trailing year that does not come after the
/// target is ignored. Returns `None` for an empty dataset.
pub fn resolve_periods(
    records: &[Record],
    target: Option<i32>,
    trailing: Option<i32>,
) -> Option<Periods> {
    let latest = records.iter().map(|r| r.year).max()?;
    let is_partial = |year: i32| {
        let months: BTreeSet<&str> = records
            .iter()
            .filter(|r| r.year == year)
            .map(|r| r.month.as_str())
            .collect();
        !months.is_empty() && months.len() < 12
    };
    let (target, trailing) = match (target, trailing) {
        (Some(t), Some(tr)) if tr > t => (t, Some(tr)),
        (Some(t), Some(tr)) => {
            warn!(
                target_year = t,
                trailing_year = tr,
                "trailing year must come after the target year; ignoring it"
            );
            (t, None)
        }
        (Some(t), None) => (t, Some(t + 1).filter(|y| is_partial(*y))),
        (None, Some(tr)) => (tr - 1, Some(tr)),
        (None, None) if is_partial(latest) => (latest - 1, Some(latest)),
        (None, None) => (latest, None),
    };
    debug!(target_year = target, trailing_year = ?trailing, "resolved report periods");
    Some(Periods {
        base: target - 1,
        target,
        trailing,
    })
}

impl BankSummary {
    pub fn total(&self) -> u64 {
        self.yearly_totals.values().sum()
    }

    pub fn year_total(&self, year: i32) -> Option<u64> {
        self.yearly_totals.get(&year).copied()
    }

    pub fn months_in(&self, year: i32) -> impl Iterator<Item = (&MonthKey, u64)> {
        self.monthly_totals
            .iter()
            .filter(move |(k, _)| k.year == year)
            .map(|(k, v)| (k, *v))
    }

    pub fn distinct_month_count(&self, year: i32) -> usize {
        self.months_in(year).count()
    }

    /// Month with the largest total in `year`. Ties go to the earliest
    /// calendar month.
    pub fn peak_month(&self, year: i32) -> Option<(&MonthKey, u64)> {
        let mut best: Option<(&MonthKey, u64)> = None;
        for (key, amount) in self.months_in(year) {
            match best {
                Some((_, top)) if amount <= top => {}
                _ => best = Some((key, amount)),
            }
        }
        best
    }

    pub fn average_monthly(&self, year: i32) -> Option<f64> {
        let total = self.year_total(year)?;
        let months = self.distinct_month_count(year);
        if months == 0 {
            return None;
        }
        Some(total as f64 / months as f64)
    }

    /// Raw-total growth in percent from `from` to `to`. `Ok(None)` when
    /// either year is absent.
    pub fn growth(&self, from: i32, to: i32) -> Result<Option<f64>> {
        let (Some(a), Some(b)) = (self.year_total(from), self.year_total(to)) else {
            return Ok(None);
        };
        if a == 0 {
            return Err(ReportError::DivisionUndefined { from, to });
        }
        Ok(Some((b as f64 - a as f64) / a as f64 * 100.0))
    }

    /// Growth of average monthly spend; used when `to` is a partial year.
    pub fn monthly_average_growth(&self, from: i32, to: i32) -> Result<Option<f64>> {
        let (Some(a), Some(b)) = (self.average_monthly(from), self.average_monthly(to)) else {
            return Ok(None);
        };
        if a == 0.0 {
            return Err(ReportError::DivisionUndefined { from, to });
        }
        Ok(Some((b - a) / a * 100.0))
    }

    /// Platforms by descending total, ties by code.
    pub fn ranked_platforms(&self) -> Vec<(&str, u64)> {
        rank(&self.platform_totals)
    }

    pub fn ranked_platforms_in(&self, year: i32) -> Vec<(&str, u64)> {
        self.platform_by_year.get(&year).map(rank).unwrap_or_default()
    }

    /// Platforms active in `year` that had no records in the previous year.
    pub fn new_platforms(&self, year: i32) -> Vec<&str> {
        let (Some(current), Some(previous)) = (
            self.platform_by_year.get(&year),
            self.platform_by_year.get(&(year - 1)),
        ) else {
            return Vec::new();
        };
        current
            .keys()
            .filter(|p| !previous.contains_key(*p))
            .map(String::as_str)
            .collect()
    }
}

fn rank(totals: &BTreeMap<String, u64>) -> Vec<(&str, u64)> {
    let mut v: Vec<(&str, u64)> = totals.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    v.sort_by(|a, b| match b.1.cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });
    v
}
