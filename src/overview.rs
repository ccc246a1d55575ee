use crate::types::{BankSummary, MonthKey, Periods, Record};
use crate::util::{format_compact, month_ordinal};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Figures across every bank in the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketOverview {
    /// Summed across banks, so it is kept wider than the per-bank totals.
    pub total: u128,
    pub banks: usize,
    pub first_month: Option<MonthKey>,
    pub last_month: Option<MonthKey>,
    pub top_spender: Option<(String, u64)>,
    pub largest_record: Option<Record>,
    pub comparisons: Vec<YoYComparison>,
}

/// One bank's spend in the two compared years.
#[derive(Debug, Clone, PartialEq)]
pub struct BankYoY {
    pub bank: String,
    pub from_spend: u128,
    pub to_spend: u128,
    /// Zero when the bank had no spend in the earlier year.
    pub change_pct: f64,
}

impl BankYoY {
    pub fn absolute_change(&self) -> i128 {
        self.to_spend as i128 - self.from_spend as i128
    }
}

/// Cross-bank comparison of two years.
#[derive(Debug, Clone, PartialEq)]
pub struct YoYComparison {
    pub from: i32,
    pub to: i32,
    /// Only months observed in `to` were counted, in both years.
    pub like_for_like: bool,
    pub banks: Vec<BankYoY>,
}

pub fn market_overview(
    records: &[Record],
    summaries: &BTreeMap<String, BankSummary>,
    periods: &Periods,
) -> MarketOverview {
    let known_months = records.iter().filter_map(|r| {
        month_ordinal(&r.month).map(|ordinal| MonthKey {
            year: r.year,
            ordinal,
            label: r.month.clone(),
        })
    });
    let (first_month, last_month) = known_months.fold((None, None), |(lo, hi), key| {
        let lo = match lo {
            Some(l) if l <= key => Some(l),
            _ => Some(key.clone()),
        };
        let hi = match hi {
            Some(h) if h >= key => Some(h),
            _ => Some(key),
        };
        (lo, hi)
    });

    // Ties keep the alphabetically first bank.
    let top_spender = summaries
        .iter()
        .map(|(bank, s)| (bank, s.total()))
        .fold(None::<(&String, u64)>, |best, (bank, total)| match best {
            Some((_, top)) if total <= top => best,
            _ => Some((bank, total)),
        })
        .map(|(bank, total)| (bank.clone(), total));

    // Ties keep the earliest row.
    let largest_record = records
        .iter()
        .fold(None::<&Record>, |best, r| match best {
            Some(b) if r.amount <= b.amount => best,
            _ => Some(r),
        })
        .cloned();

    MarketOverview {
        total: records.iter().map(|r| r.amount as u128).sum(),
        banks: summaries.len(),
        first_month,
        last_month,
        top_spender,
        largest_record,
        comparisons: comparisons(records, periods),
    }
}

/// Base vs target on full years, then target vs trailing on the months
/// the trailing year has so far.
pub fn comparisons(records: &[Record], periods: &Periods) -> Vec<YoYComparison> {
    let mut out: Vec<YoYComparison> = yoy_comparison(records, periods.base, periods.target, false)
        .into_iter()
        .collect();
    if let Some(trailing) = periods.trailing {
        out.extend(yoy_comparison(records, periods.target, trailing, true));
    }
    out
}

/// Per-bank spend in `from` and `to`. With `like_for_like`, both years are
/// restricted to the month names that appear in `to`, so a partial year is
/// compared against the same stretch of the earlier one. Returns `None`
/// when neither year has records.
pub fn yoy_comparison(
    records: &[Record],
    from: i32,
    to: i32,
    like_for_like: bool,
) -> Option<YoYComparison> {
    // "March 2025" and "March 2024" share the key "march".
    let month_key = |label: &str| {
        label
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase()
    };
    let months_in_to: BTreeSet<String> = records
        .iter()
        .filter(|r| r.year == to)
        .map(|r| month_key(&r.month))
        .collect();

    let mut totals: BTreeMap<&str, (u128, u128)> = BTreeMap::new();
    for r in records.iter().filter(|r| r.year == from || r.year == to) {
        if like_for_like && !months_in_to.contains(&month_key(&r.month)) {
            continue;
        }
        let e = totals.entry(r.bank.as_str()).or_insert((0, 0));
        if r.year == from {
            e.0 += r.amount as u128;
        } else {
            e.1 += r.amount as u128;
        }
    }
    if totals.is_empty() {
        return None;
    }

    let banks = totals
        .into_iter()
        .map(|(bank, (from_spend, to_spend))| BankYoY {
            bank: bank.to_string(),
            from_spend,
            to_spend,
            change_pct: if from_spend > 0 {
                (to_spend as f64 - from_spend as f64) / from_spend as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();
    Some(YoYComparison {
        from,
        to,
        like_for_like,
        banks,
    })
}

/// First bank (in name order) with the greatest key.
fn top_by<F>(banks: &[BankYoY], key: F) -> Option<&BankYoY>
where
    F: Fn(&BankYoY, &BankYoY) -> Ordering,
{
    banks.iter().fold(None, |best, b| match best {
        Some(top) if key(b, top) != Ordering::Greater => best,
        _ => Some(b),
    })
}

impl YoYComparison {
    pub fn sentences(&self) -> Vec<String> {
        let (from, to) = (self.from, self.to);
        let by_pct = |a: &BankYoY, b: &BankYoY| {
            a.change_pct.partial_cmp(&b.change_pct).unwrap_or(Ordering::Equal)
        };
        let mut out = Vec::new();

        if let Some(top) = top_by(&self.banks, by_pct).filter(|b| b.change_pct > 0.0) {
            out.push(format!(
                "{} registered the highest YoY growth of {:.0}%, increasing from {} in {} to {} in {}.",
                top.bank,
                top.change_pct,
                format_compact(top.from_spend as f64),
                from,
                format_compact(top.to_spend as f64),
                to
            ));
        }

        if let Some(top) = top_by(&self.banks, |a, b| a.to_spend.cmp(&b.to_spend)) {
            let sign = if top.change_pct > 0.0 { "+" } else { "" };
            out.push(format!(
                "{} led total investment in {} with {}, a {}{:.0}% change from {}.",
                top.bank,
                to,
                format_compact(top.to_spend as f64),
                sign,
                top.change_pct,
                from
            ));
        }

        if let Some(top) = top_by(&self.banks, |a, b| a.absolute_change().cmp(&b.absolute_change()))
            .filter(|b| b.absolute_change() > 0)
        {
            out.push(format!(
                "{} had the largest absolute increase, investing an additional {} in {} compared to {}.",
                top.bank,
                format_compact(top.absolute_change() as f64),
                to,
                from
            ));
        }

        let worst = top_by(&self.banks, |a, b| by_pct(b, a)).filter(|b| b.change_pct < 0.0);
        if let Some(worst) = worst {
            out.push(format!(
                "{} reduced its investment by {:.0}%, from {} in {} to {} in {}.",
                worst.bank,
                worst.change_pct.abs(),
                format_compact(worst.from_spend as f64),
                from,
                format_compact(worst.to_spend as f64),
                to
            ));
        } else {
            let total_from: u128 = self.banks.iter().map(|b| b.from_spend).sum();
            let total_to: u128 = self.banks.iter().map(|b| b.to_spend).sum();
            if total_from > 0 && total_to > total_from {
                let overall = (total_to as f64 - total_from as f64) / total_from as f64 * 100.0;
                out.push(format!(
                    "All analyzed institutions increased their social media investment, with an \
                     overall sector growth of {:.0}% from {} to {}.",
                    overall, from, to
                ));
            }
        }
        out
    }
}

impl MarketOverview {
    pub fn date_range(&self) -> Option<String> {
        let (first, last) = (self.first_month.as_ref()?, self.last_month.as_ref()?);
        Some(format!("{} – {}", first.label, last.label))
    }

    pub fn sentences(&self) -> Vec<String> {
        let mut out = Vec::new();
        let period = self
            .date_range()
            .map(|r| format!(" during the {} period", r))
            .unwrap_or_default();
        out.push(format!(
            "Investment in social media advertising across {} banks totaled {}{}.",
            self.banks,
            format_compact(self.total as f64),
            period
        ));
        if let Some((bank, total)) = &self.top_spender {
            out.push(format!(
                "{} had the highest total social investment with {}.",
                bank,
                format_compact(*total as f64)
            ));
        }
        if let Some(r) = &self.largest_record {
            out.push(format!(
                "The highest single-month spend was recorded by {} in {}, with an investment of {}.",
                r.bank,
                r.month,
                format_compact(r.amount as f64)
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::aggregate;

    const PERIODS: Periods = Periods {
        base: 2023,
        target: 2024,
        trailing: Some(2025),
    };

    fn rec(bank: &str, month: &str, year: i32, amount: u64) -> Record {
        Record {
            bank: bank.into(),
            month: month.into(),
            year,
            platform: "X.COM".into(),
            amount,
        }
    }

    #[test]
    fn summarises_the_whole_market() {
        let records = vec![
            rec("CHASE", "May 2024", 2024, 2_000_000),
            rec("CITI", "April 2023", 2023, 500_000),
            rec("CITI", "March 2025", 2025, 2_000_000),
            rec("CHASE", "Smarch 2026", 2026, 1),
        ];
        let summaries = aggregate(&records).unwrap();
        let o = market_overview(&records, &summaries, &PERIODS);
        assert_eq!(o.total, 4_500_001);
        assert_eq!(o.banks, 2);
        assert_eq!(o.date_range().as_deref(), Some("April 2023 – March 2025"));
        assert_eq!(o.top_spender, Some(("CITI".to_string(), 2_500_000)));
        assert_eq!(o.largest_record.as_ref().map(|r| r.month.as_str()), Some("May 2024"));

        let s = o.sentences();
        assert_eq!(
            s[0],
            "Investment in social media advertising across 2 banks totaled $4.5M during the \
             April 2023 – March 2025 period."
        );
        assert_eq!(s[1], "CITI had the highest total social investment with $2.5M.");
        assert_eq!(
            s[2],
            "The highest single-month spend was recorded by CHASE in May 2024, with an investment of $2M."
        );
    }

    #[test]
    fn empty_market() {
        let o = market_overview(&[], &BTreeMap::new(), &PERIODS);
        assert_eq!(o.total, 0);
        assert!(o.date_range().is_none());
        assert_eq!(o.sentences().len(), 1);
        assert!(o.comparisons.is_empty());
    }

    #[test]
    fn total_does_not_overflow_across_banks() {
        let records = vec![
            rec("CHASE", "May 2024", 2024, u64::MAX),
            rec("CITI", "May 2024", 2024, u64::MAX),
        ];
        let summaries = aggregate(&records).unwrap();
        let o = market_overview(&records, &summaries, &PERIODS);
        assert_eq!(o.total, 2 * u64::MAX as u128);
    }

    #[test]
    fn like_for_like_keeps_only_months_seen_in_later_year() {
        let records = vec![
            rec("CHASE", "January 2024", 2024, 100),
            rec("CHASE", "February 2024", 2024, 100),
            rec("CHASE", "December 2024", 2024, 1_000),
            rec("CHASE", "January 2025", 2025, 150),
            rec("CHASE", "February 2025", 2025, 150),
        ];
        let same_months = yoy_comparison(&records, 2024, 2025, true).unwrap();
        assert_eq!(same_months.banks[0].from_spend, 200);
        assert_eq!(same_months.banks[0].to_spend, 300);
        assert_eq!(same_months.banks[0].change_pct, 50.0);

        let full = yoy_comparison(&records, 2024, 2025, false).unwrap();
        assert_eq!(full.banks[0].from_spend, 1_200);
        assert!(full.banks[0].change_pct < 0.0);
    }

    #[test]
    fn yoy_sentences_name_the_leaders() {
        let records = vec![
            rec("CHASE", "May 2023", 2023, 1_000_000),
            rec("CHASE", "May 2024", 2024, 3_000_000),
            rec("CITI", "May 2023", 2023, 100_000),
            rec("CITI", "May 2024", 2024, 500_000),
            rec("PNC BANK", "May 2023", 2023, 800_000),
            rec("PNC BANK", "May 2024", 2024, 400_000),
        ];
        let c = yoy_comparison(&records, 2023, 2024, false).unwrap();
        assert_eq!(
            c.sentences(),
            vec![
                "CITI registered the highest YoY growth of 400%, increasing from $100K in 2023 to $500K in 2024.",
                "CHASE led total investment in 2024 with $3M, a +200% change from 2023.",
                "CHASE had the largest absolute increase, investing an additional $2M in 2024 compared to 2023.",
                "PNC BANK reduced its investment by 50%, from $800K in 2023 to $400K in 2024.",
            ]
        );
    }

    #[test]
    fn sector_growth_when_no_bank_declined() {
        let records = vec![
            rec("CHASE", "May 2023", 2023, 100),
            rec("CHASE", "May 2024", 2024, 150),
            rec("CITI", "May 2023", 2023, 100),
            rec("CITI", "May 2024", 2024, 150),
        ];
        let c = yoy_comparison(&records, 2023, 2024, false).unwrap();
        let s = c.sentences();
        assert_eq!(
            s.last().unwrap(),
            "All analyzed institutions increased their social media investment, with an overall \
             sector growth of 50% from 2023 to 2024."
        );
        // Equal growth: the first bank by name leads.
        assert!(s[0].starts_with("CHASE registered"));
    }

    #[test]
    fn comparisons_follow_periods() {
        let records = vec![
            rec("CHASE", "May 2023", 2023, 1),
            rec("CHASE", "May 2024", 2024, 1),
            rec("CHASE", "May 2025", 2025, 1),
        ];
        let c = comparisons(&records, &PERIODS);
        assert_eq!(c.len(), 2);
        assert_eq!((c[0].from, c[0].to, c[0].like_for_like), (2023, 2024, false));
        assert_eq!((c[1].from, c[1].to, c[1].like_for_like), (2024, 2025, true));
        assert!(yoy_comparison(&records, 2020, 2021, false).is_none());
    }
}
