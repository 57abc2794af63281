use csv::StringRecord;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Runs of whitespace, slashes, currency glyphs and parentheses all
    /// collapse to a single underscore, so alias matching is stable across
    /// minor export-format drift ("Debit/Credit (₦)" -> "debit_credit_").
    static ref HEADER_JUNK: Regex = Regex::new(r"[\s/₦()]+").unwrap();
}

/// Ordered alias candidates per canonical field, matched exactly against
/// normalised header labels. Earlier aliases win.
const TRANS_DATE_ALIASES: &[&str] = &["trans._date", "trans_date", "date"];
const VALUE_DATE_ALIASES: &[&str] = &["value_date", "val._date"];
const DESCRIPTION_ALIASES: &[&str] = &["description", "narrative", "remarks"];
const DEBIT_CREDIT_ALIASES: &[&str] = &["debit_credit_", "debit_credit", "amount"];
const BALANCE_ALIASES: &[&str] = &["balance_", "balance"];
const CHANNEL_ALIASES: &[&str] = &["channel"];
const REFERENCE_ALIASES: &[&str] = &["transaction_reference", "reference"];
const COUNTERPARTY_ALIASES: &[&str] = &["counterparty", "beneficiary"];

/// Column indices of a statement file, resolved once per file from the
/// header row. 0-based, indexing into the raw CSV records. A None means
/// the export carries no column for that field and it will be defaulted.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ResolvedColumns {
    /// Columns that survive placeholder dropping. Row emptiness is judged
    /// over these.
    pub(crate) kept: Vec<usize>,
    pub(crate) trans_date: Option<usize>,
    pub(crate) value_date: Option<usize>,
    pub(crate) description: Option<usize>,
    pub(crate) debit_credit: Option<usize>,
    pub(crate) balance: Option<usize>,
    pub(crate) channel: Option<usize>,
    pub(crate) transaction_reference: Option<usize>,
    pub(crate) counterparty: Option<usize>,
}

/// Trim, lowercase and collapse separator runs so header labels from
/// different export versions compare equal.
pub(crate) fn normalize_header(raw: &str) -> String {
    HEADER_JUNK.replace_all(raw.trim(), "_").to_lowercase()
}

/// Spreadsheet writers emit "Unnamed: N" headers for stray columns.
fn is_placeholder(normalized: &str) -> bool {
    normalized.contains("unnamed")
}

pub(crate) fn resolve_columns(headers: &StringRecord) -> ResolvedColumns {
    let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
    let kept: Vec<usize> = normalized
        .iter()
        .enumerate()
        .filter(|(_, h)| !is_placeholder(h))
        .map(|(i, _)| i)
        .collect();

    let find = |aliases: &[&str]| -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| kept.iter().copied().find(|&i| normalized[i] == *alias))
    };

    let trans_date = find(TRANS_DATE_ALIASES);
    let value_date = find(VALUE_DATE_ALIASES);
    let description = find(DESCRIPTION_ALIASES);
    let debit_credit = find(DEBIT_CREDIT_ALIASES);
    let balance = find(BALANCE_ALIASES);
    let channel = find(CHANNEL_ALIASES);
    let transaction_reference = find(REFERENCE_ALIASES);
    let counterparty = find(COUNTERPARTY_ALIASES);

    ResolvedColumns {
        kept,
        trans_date,
        value_date,
        description,
        debit_credit,
        balance,
        channel,
        transaction_reference,
        counterparty,
    }
}
