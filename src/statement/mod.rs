pub(crate) mod column;

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::info;

use crate::categorize::Category;
use crate::normalize::{extract_credit, extract_debit, normalize_channel, parse_balance, parse_date};
use crate::statement::column::{resolve_columns, ResolvedColumns};
use crate::transaction::CanonicalTransaction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StatementError {
    FileNotFound(String),
    InvalidFile(String),
}

impl fmt::Display for StatementError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "statement reading error: {}",
            match self {
                StatementError::FileNotFound(s) => s,
                StatementError::InvalidFile(s) => s,
            }
        )
    }
}

impl std::error::Error for StatementError {}

/// Read a statement export and produce canonical transactions in file
/// order. The export carries `skip_rows` preamble rows of account metadata
/// before the header row; data rows follow the header.
pub(crate) fn read_statement(
    file_path: &Path,
    skip_rows: usize,
) -> Result<Vec<CanonicalTransaction>, StatementError> {
    if !file_path.exists() {
        return Err(StatementError::FileNotFound(format!(
            "{} not found",
            file_path.display()
        )));
    }

    info!("Reading statement {}", file_path.display());
    let file = fs::File::open(file_path)
        .map_err(|e| StatementError::InvalidFile(e.to_string()))?;
    read_from(file, skip_rows)
}

fn read_from<R: Read>(reader: R, skip_rows: usize) -> Result<Vec<CanonicalTransaction>, StatementError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = rdr.records();
    for _ in 0..skip_rows {
        match records.next() {
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(StatementError::InvalidFile(e.to_string())),
            None => {
                return Err(StatementError::InvalidFile(
                    "file ends before the header row".to_string(),
                ))
            }
        }
    }

    let headers = match records.next() {
        Some(Ok(row)) => row,
        Some(Err(e)) => return Err(StatementError::InvalidFile(e.to_string())),
        None => {
            return Err(StatementError::InvalidFile(
                "no header row after the preamble".to_string(),
            ))
        }
    };

    let columns = resolve_columns(&headers);
    log_unresolved(&columns);

    let mut transactions = vec![];
    for record in records {
        let row = record.map_err(|e| StatementError::InvalidFile(e.to_string()))?;
        if is_empty_row(&row, &columns) {
            continue;
        }
        transactions.push(to_transaction(&row, &columns));
    }

    info!("Read {} transactions", transactions.len());
    Ok(transactions)
}

/// A row with nothing in any kept column is filler between statement
/// sections, not a transaction.
fn is_empty_row(row: &StringRecord, columns: &ResolvedColumns) -> bool {
    columns
        .kept
        .iter()
        .all(|&i| row.get(i).map_or(true, |v| v.trim().is_empty()))
}

fn to_transaction(row: &StringRecord, columns: &ResolvedColumns) -> CanonicalTransaction {
    let signed_amount = cell(row, columns.debit_credit);

    CanonicalTransaction {
        trans_date: parse_date(cell(row, columns.trans_date)),
        value_date: parse_date(cell(row, columns.value_date)),
        description: cell(row, columns.description).trim().to_string(),
        debit: extract_debit(signed_amount),
        credit: extract_credit(signed_amount),
        balance: parse_balance(cell(row, columns.balance)),
        channel: normalize_channel(cell(row, columns.channel)),
        transaction_reference: non_empty(cell(row, columns.transaction_reference)),
        counterparty: non_empty(cell(row, columns.counterparty)),
        category: Category::Other,
    }
}

fn cell<'a>(row: &'a StringRecord, index: Option<usize>) -> &'a str {
    index.and_then(|i| row.get(i)).unwrap_or("")
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn log_unresolved(columns: &ResolvedColumns) {
    let mut missing = vec![];
    if columns.trans_date.is_none() {
        missing.push("trans_date");
    }
    if columns.value_date.is_none() {
        missing.push("value_date");
    }
    if columns.description.is_none() {
        missing.push("description");
    }
    if columns.debit_credit.is_none() {
        missing.push("debit_credit");
    }
    if columns.balance.is_none() {
        missing.push("balance");
    }
    if columns.channel.is_none() {
        missing.push("channel");
    }
    if columns.transaction_reference.is_none() {
        missing.push("transaction_reference");
    }
    if columns.counterparty.is_none() {
        missing.push("counterparty");
    }
    if !missing.is_empty() {
        info!("Columns not present in this export, defaulting: {}", missing.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rust_decimal::Decimal;

    use super::*;

    const STATEMENT: &str = "\
Account Statement,,,,,,,
benjamin nwandu,8066508017,,,,,,
Trans. Date,Value Date,Description,Debit/Credit (₦),Balance (₦),Channel,Transaction Reference,Counterparty
2025-01-03,2025-01-03,Transfer to John,\"-1,500.00\",\"₦10,500.00\",TRANSFER,TRX001,John Doe
,,,,,,,
2025-01-05,2025-01-06,MTN Airtime,-500,\"₦10,000.00\",USSD,TRX002,
2025-01-09,2025-01-09,Salary,\"+250,000\",\"₦260,000.00\",transfer,TRX003,Acme Ltd
";

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn read(input: &str, skip_rows: usize) -> Vec<CanonicalTransaction> {
        read_from(Cursor::new(input.to_string()), skip_rows).unwrap()
    }

    #[test]
    fn well_formed_rows_round_trip_without_field_loss() {
        let transactions = read(STATEMENT, 2);
        assert_eq!(transactions.len(), 3);

        let first = &transactions[0];
        assert_eq!(first.trans_date, chrono::NaiveDate::from_ymd_opt(2025, 1, 3));
        assert_eq!(first.description, "Transfer to John");
        assert_eq!(first.debit, dec("1500.00"));
        assert_eq!(first.credit, Decimal::ZERO);
        assert_eq!(first.balance, Some(dec("10500.00")));
        assert_eq!(first.channel, "TRANSFER");
        assert_eq!(first.transaction_reference, Some("TRX001".to_string()));
        assert_eq!(first.counterparty, Some("John Doe".to_string()));
    }

    #[test]
    fn signed_column_splits_into_debit_and_credit() {
        let transactions = read(STATEMENT, 2);
        let salary = &transactions[2];
        assert_eq!(salary.credit, dec("250000"));
        assert_eq!(salary.debit, Decimal::ZERO);
    }

    #[test]
    fn empty_rows_are_dropped() {
        // The blank row between the first and second transaction.
        let transactions = read(STATEMENT, 2);
        assert_eq!(transactions.len(), 3);
    }

    #[test]
    fn row_order_is_preserved() {
        let transactions = read(STATEMENT, 2);
        let references: Vec<_> = transactions
            .iter()
            .map(|t| t.transaction_reference.as_deref())
            .collect();
        assert_eq!(references, vec![Some("TRX001"), Some("TRX002"), Some("TRX003")]);
    }

    #[test]
    fn missing_optional_columns_default() {
        let input = "\
preamble,,
skip me,,
Trans. Date,Description,Debit/Credit (₦)
2025-02-01,POS Purchase,-200
";
        let transactions = read(input, 2);
        assert_eq!(transactions.len(), 1);
        let t = &transactions[0];
        assert_eq!(t.channel, "UNKNOWN");
        assert_eq!(t.balance, None);
        assert_eq!(t.value_date, None);
        assert_eq!(t.counterparty, None);
    }

    #[test]
    fn unnamed_only_content_does_not_keep_a_row() {
        let input = "\
preamble,,,
skip me,,,
Trans. Date,Description,Debit/Credit (₦),Unnamed: 3
2025-02-01,POS Purchase,-200,x
,,,leftover
";
        let transactions = read(input, 2);
        assert_eq!(transactions.len(), 1);
    }

    #[test]
    fn malformed_cells_recover_locally() {
        let input = "\
preamble
skip me
Trans. Date,Description,Debit/Credit (₦)
not a date,Mystery charge,garbage
";
        let transactions = read(input, 2);
        assert_eq!(transactions.len(), 1);
        let t = &transactions[0];
        assert_eq!(t.trans_date, None);
        assert_eq!(t.debit, Decimal::ZERO);
        assert_eq!(t.credit, Decimal::ZERO);
        assert_eq!(t.description, "Mystery charge");
    }

    #[test]
    fn truncated_file_is_an_error() {
        let err = read_from(Cursor::new("only one row".to_string()), 2).unwrap_err();
        assert!(matches!(err, StatementError::InvalidFile(_)));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_statement(Path::new("/no/such/statement.csv"), 2).unwrap_err();
        assert!(matches!(err, StatementError::FileNotFound(_)));
    }
}
