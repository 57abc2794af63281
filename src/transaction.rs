use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::categorize::Category;

/// A normalised statement row, independent of the export's column naming
/// and formatting quirks. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CanonicalTransaction {
    pub(crate) trans_date: Option<NaiveDate>,
    pub(crate) value_date: Option<NaiveDate>,
    pub(crate) description: String,
    pub(crate) debit: Decimal,
    pub(crate) credit: Decimal,
    pub(crate) balance: Option<Decimal>,
    pub(crate) channel: String,
    pub(crate) transaction_reference: Option<String>,
    pub(crate) counterparty: Option<String>,

    /// Derived from the description. Never persisted.
    pub(crate) category: Category,
}

impl CanonicalTransaction {
    /// Month bucket used for trend aggregation and filtering, e.g. "2025-03".
    /// None when the transaction date is unknown.
    pub(crate) fn month_key(&self) -> Option<String> {
        self.trans_date.map(|d| d.format("%Y-%m").to_string())
    }
}
