use crate::error::{ReportError, Result};
use crate::types::{RawRow, Record};
use crate::util::{parse_i32_safe, parse_u64_safe};
use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const REQUIRED_COLUMNS: [&str; 5] = ["Bank", "Month", "Year", "Distributor", "dollars"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub banks: usize,
    pub defaulted_fields: usize,
}

pub fn load_path(path: &Path) -> Result<(Vec<Record>, LoadReport)> {
    info!(path = %path.display(), "loading spend records");
    let file = File::open(path)?;
    load_records(file)
}

/// Read every row of a delimited table into `Record`s, in input order.
///
/// The header must name all of [`REQUIRED_COLUMNS`]; extra columns are
/// ignored. A `Year` or `dollars` cell that is not a non-negative integer
/// aborts the load with the 1-based data row number. Blank text cells fall
/// back to placeholder values and are counted in the report.
pub fn load_records<R: Read>(reader: R) -> Result<(Vec<Record>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    // Check the header up front so a missing column fails before any row
    // is read, instead of surfacing as a per-row deserialize error.
    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ReportError::MissingColumn(column));
        }
    }

    let mut records = Vec::new();
    let mut defaulted_fields = 0usize;
    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        // 1-based data row; the header line is not counted.
        let row_no = idx + 1;
        let row = result?;

        // Numeric cells are strict: a bad value aborts the whole load.
        let year = parse_i32_safe(row.year.as_deref()).ok_or_else(|| ReportError::MalformedRow {
            row: row_no,
            column: "Year",
            value: row.year.clone().unwrap_or_default(),
        })?;
        let amount =
            parse_u64_safe(row.dollars.as_deref()).ok_or_else(|| ReportError::MalformedRow {
                row: row_no,
                column: "dollars",
                value: row.dollars.clone().unwrap_or_default(),
            })?;

        // Text cells are forgiving: blanks get a placeholder and are counted.
        let mut text = |value: Option<String>, fallback: &str| match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                defaulted_fields += 1;
                fallback.to_string()
            }
        };
        let bank = text(row.bank, "Unknown Bank");
        let month = text(row.month, "Unknown");
        let platform = text(row.distributor, "UNKNOWN");

        records.push(Record {
            bank,
            month,
            year,
            platform,
            amount,
        });
    }

    if defaulted_fields > 0 {
        debug!(defaulted_fields, "blank text cells replaced with placeholders");
    }
    let banks = records.iter().map(|r| r.bank.as_str()).collect::<HashSet<_>>().len();
    let report = LoadReport {
        total_rows: records.len(),
        banks,
        defaulted_fields,
    };
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn loads_rows_in_order() {
        let csv = "Bank,Year,Month,Media,Channel,Distributor,Type,dollars\n\
                   BankA,2023,January 2023,Social,Paid,FACEBOOK.COM,Display,100\n\
                   BankA,2023,January 2023,Social,Paid,TIKTOK.COM,Display,50\n\
                   BankB,2024,February 2024,Social,Paid,X.COM,Display,\"1,300\"\n";
        let (records, report) = load_records(Cursor::new(csv)).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(report.banks, 2);
        assert_eq!(report.defaulted_fields, 0);
        assert_eq!(
            records[0],
            Record {
                bank: "BankA".into(),
                month: "January 2023".into(),
                year: 2023,
                platform: "FACEBOOK.COM".into(),
                amount: 100,
            }
        );
        assert_eq!(records[2].amount, 1300);
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "Bank,Month,Year,dollars\nBankA,January 2023,2023,10\n";
        let err = load_records(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, ReportError::MissingColumn("Distributor")));
    }

    #[test]
    fn malformed_amount_names_the_row() {
        let csv = "Bank,Month,Year,Distributor,dollars\n\
                   BankA,January 2023,2023,FACEBOOK.COM,10\n\
                   BankA,February 2023,2023,FACEBOOK.COM,ten\n";
        match load_records(Cursor::new(csv)).unwrap_err() {
            ReportError::MalformedRow { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "dollars");
                assert_eq!(value, "ten");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_amount_and_bad_year_are_malformed() {
        let csv = "Bank,Month,Year,Distributor,dollars\nBankA,May 2023,2023,X.COM,-1\n";
        assert!(matches!(
            load_records(Cursor::new(csv)),
            Err(ReportError::MalformedRow { column: "dollars", .. })
        ));
        let csv = "Bank,Month,Year,Distributor,dollars\nBankA,May 2023,FY23,X.COM,1\n";
        assert!(matches!(
            load_records(Cursor::new(csv)),
            Err(ReportError::MalformedRow { column: "Year", .. })
        ));
    }

    #[test]
    fn blank_text_cells_get_placeholders() {
        let csv = "Bank,Month,Year,Distributor,dollars\n,May 2023,2023,,5\n";
        let (records, report) = load_records(Cursor::new(csv)).unwrap();
        assert_eq!(records[0].bank, "Unknown Bank");
        assert_eq!(records[0].platform, "UNKNOWN");
        assert_eq!(report.defaulted_fields, 2);
    }
}
