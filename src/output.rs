use crate::error::{ReportError, Result};
use crate::overview::MarketOverview;
use crate::platform::display_name;
use crate::types::{
    BankExport, BankReport, BankSummary, PeakMonthRow, Periods, PlatformRow, QuarterRow,
    YearTotalRow,
};
use crate::util::{format_dollars, format_int, format_number, share_pct};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct DisplayOptions {
    pub tables: bool,
}

pub fn render_report<W: Write>(
    out: &mut W,
    overview: &MarketOverview,
    banks: &BTreeMap<String, BankReport>,
    periods: &Periods,
    options: DisplayOptions,
) -> io::Result<()> {
    writeln!(out, "=== BANKING SOCIAL MEDIA INSIGHTS ===\n")?;
    for sentence in overview.sentences() {
        writeln!(out, "- {}", sentence)?;
    }
    writeln!(out)?;
    for comparison in &overview.comparisons {
        let scope = if comparison.like_for_like {
            " (same months only)"
        } else {
            ""
        };
        writeln!(
            out,
            "Year-over-year {} vs {}{}:",
            comparison.from, comparison.to, scope
        )?;
        for sentence in comparison.sentences() {
            writeln!(out, "- {}", sentence)?;
        }
        writeln!(out)?;
    }

    for (bank, report) in banks {
        writeln!(out, "## {}", bank)?;
        if options.tables {
            render_statistics(out, &report.summary, periods)?;
        }
        writeln!(out, "### {} Performance Insights:", periods.target)?;
        if report.insights.is_empty() {
            writeln!(out, "(no insights)")?;
        }
        for (i, insight) in report.insights.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, insight.text)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_statistics<W: Write>(out: &mut W, s: &BankSummary, periods: &Periods) -> io::Result<()> {
    writeln!(
        out,
        "{} records, {} total\n",
        format_int(s.record_count),
        format_dollars(s.total() as f64)
    )?;
    writeln!(out, "Yearly totals:")?;
    write_table(out, &yearly_rows(s, periods))?;

    writeln!(out, "Platform totals:")?;
    write_table(out, &platform_rows(s))?;

    writeln!(out, "Peak months:")?;
    write_table(out, &peak_rows(s))?;

    writeln!(out, "Quarterly totals:")?;
    match &s.quarterly_totals {
        Some(q) => {
            let rows: Vec<QuarterRow> = q
                .iter()
                .map(|(&(year, quarter), &total)| QuarterRow {
                    year,
                    quarter,
                    total: format_dollars(total as f64),
                })
                .collect();
            write_table(out, &rows)?;
        }
        None => writeln!(out, "(unavailable: unrecognised month names)\n")?,
    }

    if let Some(&latest) = s.yearly_totals.keys().last() {
        let added = s.new_platforms(latest);
        if !added.is_empty() {
            let names: Vec<String> = added.iter().map(|p| display_name(p)).collect();
            writeln!(
                out,
                "Platform expansion: {} expanded its platform strategy in {}, adding {}.\n",
                s.bank,
                latest,
                names.join(", ")
            )?;
        }
    }
    Ok(())
}

fn yearly_rows(s: &BankSummary, periods: &Periods) -> Vec<YearTotalRow> {
    s.yearly_totals
        .iter()
        .map(|(&year, &total)| {
            let growth = if Some(year) == periods.trailing {
                s.monthly_average_growth(year - 1, year)
                    .map(|g| g.map(|v| format!("{}% (monthly avg)", format_number(v, 1))))
            } else {
                s.growth(year - 1, year)
                    .map(|g| g.map(|v| format!("{}%", format_number(v, 1))))
            };
            let yoy = match growth {
                Ok(Some(text)) => text,
                Ok(None) => "-".to_string(),
                Err(_) => "n/a".to_string(),
            };
            YearTotalRow {
                year,
                total: format_dollars(total as f64),
                yoy,
            }
        })
        .collect()
}

fn platform_rows(s: &BankSummary) -> Vec<PlatformRow> {
    let total = s.total();
    s.ranked_platforms()
        .into_iter()
        .map(|(code, amount)| PlatformRow {
            platform: display_name(code),
            total: format_dollars(amount as f64),
            share: share_pct(amount, total)
                .map(|p| format!("{}%", format_number(p, 1)))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

fn peak_rows(s: &BankSummary) -> Vec<PeakMonthRow> {
    s.yearly_totals
        .iter()
        .filter_map(|(&year, &year_total)| {
            let (key, amount) = s.peak_month(year)?;
            Some(PeakMonthRow {
                year,
                month: key.label.clone(),
                amount: format_dollars(amount as f64),
                share_of_year: share_pct(amount, year_total)
                    .map(|p| format!("{}%", format_number(p, 1)))
                    .unwrap_or_else(|| "-".to_string()),
            })
        })
        .collect()
}

fn write_table<W: Write, T: Tabled>(out: &mut W, rows: &[T]) -> io::Result<()>
where
    T: Clone,
{
    if rows.is_empty() {
        return writeln!(out, "(no rows)\n");
    }
    let table = Table::new(rows.to_vec()).with(Style::markdown()).to_string();
    writeln!(out, "{}\n", table)
}

/// Reduced export view: the first two insights under the target year's
/// label, the next two under the following period's label.
pub fn export_view(
    banks: &BTreeMap<String, BankReport>,
    periods: &Periods,
) -> BTreeMap<String, BankExport> {
    let first_label = format!("insights_{}", periods.target);
    let second_label = format!("insights_{}", periods.trailing.unwrap_or(periods.target + 1));
    banks
        .iter()
        .map(|(bank, report)| {
            let texts: Vec<String> = report.insights.iter().map(|i| i.text.clone()).collect();
            let first = texts.iter().take(2).cloned().collect();
            let second = texts.iter().skip(2).take(2).cloned().collect();
            let periods = BTreeMap::from([(first_label.clone(), first), (second_label.clone(), second)]);
            (bank.clone(), BankExport { periods })
        })
        .collect()
}

pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|source| ReportError::ExportWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::generate;
    use crate::overview::market_overview;
    use crate::reports::aggregate;
    use crate::types::Record;

    fn rec(bank: &str, month: &str, year: i32, platform: &str, amount: u64) -> Record {
        Record {
            bank: bank.into(),
            month: month.into(),
            year,
            platform: platform.into(),
            amount,
        }
    }

    const PERIODS: Periods = Periods {
        base: 2023,
        target: 2024,
        trailing: Some(2025),
    };

    fn build(records: &[Record]) -> BTreeMap<String, BankReport> {
        aggregate(records)
            .unwrap()
            .into_iter()
            .map(|(bank, summary)| {
                let insights = generate(&summary, &PERIODS);
                (bank, BankReport { summary, insights })
            })
            .collect()
    }

    fn sample() -> Vec<Record> {
        vec![
            rec("BankA", "January 2023", 2023, "FACEBOOK.COM", 100),
            rec("BankA", "January 2023", 2023, "TIKTOK.COM", 50),
            rec("BankA", "February 2024", 2024, "FACEBOOK.COM", 300),
            rec("BankA", "March 2025", 2025, "REDDIT", 60),
        ]
    }

    #[test]
    fn renders_tables_and_numbered_insights() {
        let records = sample();
        let banks = build(&records);
        let overview = market_overview(&records, &aggregate(&records).unwrap(), &PERIODS);
        let mut buf = Vec::new();
        render_report(&mut buf, &overview, &banks, &PERIODS, DisplayOptions { tables: true }).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("## BankA"));
        assert!(text.contains("100.0%"), "{text}");
        assert!(text.contains("-80.0% (monthly avg)"));
        assert!(text.contains("February 2024"));
        assert!(text.contains("Platform expansion: BankA expanded its platform strategy in 2025, adding Reddit."));
        assert!(text.contains("1. Demonstrated strong 100%"));
        assert!(text.contains("### 2024 Performance Insights:"));
    }

    #[test]
    fn insights_only_mode_skips_tables() {
        let records = sample();
        let banks = build(&records);
        let overview = market_overview(&records, &aggregate(&records).unwrap(), &PERIODS);
        let mut buf = Vec::new();
        render_report(&mut buf, &overview, &banks, &PERIODS, DisplayOptions { tables: false }).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(!text.contains("Yearly totals:"));
        assert!(text.contains("1. "));
    }

    #[test]
    fn lists_every_platform_and_the_yoy_blocks() {
        let mut records = sample();
        for p in ["X.COM", "SNAPCHAT", "PINTEREST.COM", "NEXTDOOR.COM"] {
            records.push(rec("BankA", "May 2024", 2024, p, 1));
        }
        let banks = build(&records);
        let overview = market_overview(&records, &aggregate(&records).unwrap(), &PERIODS);
        let mut buf = Vec::new();
        render_report(&mut buf, &overview, &banks, &PERIODS, DisplayOptions { tables: true }).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let platforms = banks["BankA"].summary.platform_totals.len();
        assert_eq!(platforms, 7);
        for name in ["Facebook", "TikTok", "Reddit", "X (Twitter)", "Snapchat", "Pinterest", "Nextdoor"] {
            assert!(text.contains(name), "missing {name}: {text}");
        }
        assert!(text.contains("Year-over-year 2023 vs 2024:"));
        assert!(text.contains("Year-over-year 2024 vs 2025 (same months only):"));
    }

    #[test]
    fn export_splits_insights_into_two_periods() {
        let banks = build(&sample());
        let view = export_view(&banks, &PERIODS);
        let json = serde_json::to_value(&view).unwrap();
        let a = &json["BankA"];
        assert_eq!(a["insights_2024"].as_array().unwrap().len(), 2);
        assert_eq!(a["insights_2025"].as_array().unwrap().len(), 2);
        assert!(a["insights_2024"][0].as_str().unwrap().starts_with("Demonstrated strong"));
    }

    #[test]
    fn export_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = write_json(&path, &export_view(&build(&sample()), &PERIODS)).unwrap_err();
        assert!(matches!(err, ReportError::ExportWrite { .. }));
    }
}
