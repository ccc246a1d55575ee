//! Templated insight sentences.
//!
//! Each rule checks its own preconditions and either produces one sentence
//! or nothing. Rules run in the order of [`RULES`]; a rule that does not
//! fire takes no slot.

use crate::platform::display_name;
use crate::types::{BankSummary, Insight, Periods};
use crate::util::{format_dollars, share_pct};
use tracing::debug;

pub const MAX_INSIGHTS: usize = 4;

pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&BankSummary, &Periods) -> Option<String>,
}

pub const RULES: [Rule; 4] = [
    Rule {
        name: "growth",
        apply: growth_rule,
    },
    Rule {
        name: "platform_dominance",
        apply: platform_dominance_rule,
    },
    Rule {
        name: "peak_month",
        apply: peak_month_rule,
    },
    Rule {
        name: "trailing_or_diversification",
        apply: trailing_or_diversification_rule,
    },
];

pub fn generate(summary: &BankSummary, periods: &Periods) -> Vec<Insight> {
    RULES
        .iter()
        .filter_map(|rule| match (rule.apply)(summary, periods) {
            Some(text) => Some(Insight {
                rule: rule.name,
                text,
            }),
            None => {
                debug!(bank = %summary.bank, rule = rule.name, "insight rule skipped");
                None
            }
        })
        .take(MAX_INSIGHTS)
        .collect()
}

fn growth_rule(s: &BankSummary, p: &Periods) -> Option<String> {
    let (base, target) = (p.base, p.target);
    let growth = match s.growth(base, target) {
        Ok(g) => g?,
        Err(e) => {
            debug!(bank = %s.bank, error = %e, "growth skipped");
            return None;
        }
    };
    let base_total = format_dollars(s.year_total(base)? as f64);
    let target_total = format_dollars(s.year_total(target)? as f64);
    let text = if growth > 100.0 {
        format!(
            "Achieved exceptional {growth:.0}% year-over-year growth in social media investment, \
             increasing from {base_total} in {base} to {target_total} in {target}"
        )
    } else if growth > 50.0 {
        format!(
            "Demonstrated strong {growth:.0}% year-over-year growth in social media spending, \
             reaching {target_total} in {target}"
        )
    } else if growth > 0.0 {
        format!(
            "Maintained positive {growth:.0}% growth in social media investment, \
             with {target_total} total spend in {target}"
        )
    } else {
        format!(
            "Social media spending decreased by {:.0}% from {base} to {target}, \
             totaling {target_total} in {target}",
            growth.abs()
        )
    };
    Some(text)
}

fn platform_dominance_rule(s: &BankSummary, _p: &Periods) -> Option<String> {
    let ranked = s.ranked_platforms();
    let total: u64 = ranked.iter().map(|(_, v)| v).sum();
    let &(top_code, top_amount) = ranked.first()?;
    let pct = share_pct(top_amount, total)?;
    let top = display_name(top_code);
    let top_dollars = format_dollars(top_amount as f64);

    if pct > 70.0 {
        return Some(format!(
            "Heavily concentrated on {top} with {pct:.0}% of total investment ({top_dollars}), \
             indicating a focused platform strategy"
        ));
    }
    let &(second_code, second_amount) = ranked.get(1)?;
    let second = display_name(second_code);
    let second_pct = share_pct(second_amount, total)?;
    let second_dollars = format_dollars(second_amount as f64);
    if pct > 50.0 {
        Some(format!(
            "{top} leads platform investment with {pct:.0}% share ({top_dollars}), \
             followed by {second} at {second_pct:.0}% ({second_dollars})"
        ))
    } else {
        Some(format!(
            "Balanced platform approach with {top} at {pct:.0}% ({top_dollars}) and {second} \
             at {second_pct:.0}% ({second_dollars}) of total spend"
        ))
    }
}

fn peak_month_rule(s: &BankSummary, p: &Periods) -> Option<String> {
    let year = p.target;
    let year_total = s.year_total(year)?;
    let (peak, amount) = s.peak_month(year)?;
    let pct = share_pct(amount, year_total)?;
    Some(format!(
        "Peak {year} performance in {} with {} spend, representing {pct:.0}% of annual \
         social media investment",
        peak.label,
        format_dollars(amount as f64)
    ))
}

fn trailing_or_diversification_rule(s: &BankSummary, p: &Periods) -> Option<String> {
    if let Some(trailing) = p.trailing {
        if let Some(avg) = s.average_monthly(trailing) {
            return Some(trailing_pace(s, p.target, trailing, avg));
        }
    }
    diversification(s, p.target)
}

fn trailing_pace(s: &BankSummary, target: i32, trailing: i32, avg: f64) -> String {
    let avg_dollars = format_dollars(avg);
    match s.average_monthly(target).filter(|a| *a > 0.0) {
        Some(prev) => {
            let change = (avg - prev) / prev * 100.0;
            let prev_dollars = format_dollars(prev);
            if change > 0.0 {
                format!(
                    "{trailing} shows accelerated momentum with {avg_dollars} average monthly \
                     spend, {change:.0}% higher than {target}'s {prev_dollars} monthly average"
                )
            } else {
                format!(
                    "{trailing} investment pace at {avg_dollars} average monthly spend, {:.0}% \
                     below {target}'s {prev_dollars} monthly average",
                    change.abs()
                )
            }
        }
        None => {
            let total = format_dollars(s.year_total(trailing).unwrap_or(0) as f64);
            let months = s.distinct_month_count(trailing);
            format!(
                "{trailing} performance shows {total} invested across {months} months, \
                 averaging {avg_dollars} monthly"
            )
        }
    }
}

fn diversification(s: &BankSummary, year: i32) -> Option<String> {
    let ranked = s.ranked_platforms_in(year);
    let count = ranked.len();
    if count >= 5 {
        Some(format!(
            "Diversified multi-platform strategy across {count} channels in {year}, \
             demonstrating comprehensive social media market coverage"
        ))
    } else if count >= 3 {
        let names: Vec<String> = ranked.iter().take(3).map(|(p, _)| display_name(p)).collect();
        Some(format!(
            "Strategic focus on {count} primary platforms in {year}: {}",
            names.join(", ")
        ))
    } else {
        None
    }
}
