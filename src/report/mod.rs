use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::categorize::Category;
use crate::transaction::CanonicalTransaction;

/// The immutable dataset handed to every aggregation call. Constructed
/// once per process from the persisted relation; a reload replaces the
/// whole snapshot rather than mutating it.
pub(crate) struct Snapshot {
    transactions: Vec<CanonicalTransaction>,
}

impl Snapshot {
    pub(crate) fn new(transactions: Vec<CanonicalTransaction>) -> Snapshot {
        Snapshot { transactions }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// All transactions, ascending date order.
    pub(crate) fn all(&self) -> &[CanonicalTransaction] {
        &self.transactions
    }

    /// Transactions in the given YYYY-MM bucket, or everything when no
    /// filter is active. Undated transactions never match a month filter.
    pub(crate) fn filtered(&self, month: Option<&str>) -> Vec<&CanonicalTransaction> {
        match month {
            None => self.transactions.iter().collect(),
            Some(key) => self
                .transactions
                .iter()
                .filter(|t| t.month_key().as_deref() == Some(key))
                .collect(),
        }
    }

    /// Distinct month keys present in the data, newest first. These are
    /// the legal values for a month filter.
    pub(crate) fn month_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .transactions
            .iter()
            .filter_map(|t| t.month_key())
            .collect();
        keys.sort();
        keys.dedup();
        keys.reverse();
        keys
    }
}

/// Headline figures. Spend, income and net flow cover the filtered set;
/// total saved is always all-time.
pub(crate) struct Kpis {
    pub(crate) total_spent: Decimal,
    pub(crate) total_income: Decimal,
    pub(crate) net_flow: Decimal,
    pub(crate) total_saved: Decimal,
}

pub(crate) fn kpis(snapshot: &Snapshot, month: Option<&str>) -> Kpis {
    let filtered = snapshot.filtered(month);
    let total_spent: Decimal = filtered.iter().map(|t| t.debit).sum();
    let total_income: Decimal = filtered.iter().map(|t| t.credit).sum();

    Kpis {
        total_spent,
        total_income,
        net_flow: total_income - total_spent,
        total_saved: savings_net(snapshot.all()),
    }
}

/// Per-category debit totals, largest first.
pub(crate) fn category_totals(transactions: &[&CanonicalTransaction]) -> Vec<(Category, Decimal)> {
    let mut totals: HashMap<Category, Decimal> = HashMap::new();
    for t in transactions {
        *totals.entry(t.category).or_insert(Decimal::ZERO) += t.debit;
    }

    let mut rows: Vec<(Category, Decimal)> = totals.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}

/// Per-channel debit totals, largest first.
pub(crate) fn channel_totals(transactions: &[&CanonicalTransaction]) -> Vec<(String, Decimal)> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for t in transactions {
        *totals.entry(t.channel.as_str()).or_insert(Decimal::ZERO) += t.debit;
    }

    let mut rows: Vec<(String, Decimal)> = totals
        .into_iter()
        .map(|(channel, total)| (channel.to_string(), total))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}

pub(crate) struct MonthlyTotals {
    pub(crate) month: String,
    pub(crate) debit: Decimal,
    pub(crate) credit: Decimal,
}

/// Debit/credit totals per month-year bucket, ascending by key. Undated
/// transactions carry no month and are left out.
pub(crate) fn monthly_trend(transactions: &[CanonicalTransaction]) -> Vec<MonthlyTotals> {
    let mut totals: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for t in transactions {
        if let Some(key) = t.month_key() {
            let entry = totals.entry(key).or_insert((Decimal::ZERO, Decimal::ZERO));
            entry.0 += t.debit;
            entry.1 += t.credit;
        }
    }

    totals
        .into_iter()
        .map(|(month, (debit, credit))| MonthlyTotals { month, debit, credit })
        .collect()
}

/// Amounts moved into and out of savings over the whole dataset.
pub(crate) fn savings_totals(transactions: &[CanonicalTransaction]) -> (Decimal, Decimal) {
    let mut outflow = Decimal::ZERO;
    let mut inflow = Decimal::ZERO;
    for t in transactions {
        if t.category == Category::Savings {
            outflow += t.debit;
            inflow += t.credit;
        }
    }

    (outflow, inflow)
}

/// Net amount saved: savings debits minus savings credits. Always
/// computed over the entire dataset, independent of any month filter.
pub(crate) fn savings_net(transactions: &[CanonicalTransaction]) -> Decimal {
    let (outflow, inflow) = savings_totals(transactions);
    outflow - inflow
}

/// Savings-category transactions, newest first.
pub(crate) fn savings_activity(snapshot: &Snapshot) -> Vec<&CanonicalTransaction> {
    let mut rows: Vec<&CanonicalTransaction> = snapshot
        .all()
        .iter()
        .filter(|t| t.category == Category::Savings)
        .collect();
    rows.reverse();
    rows
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::categorize;

    use super::*;

    fn tx(date: Option<&str>, description: &str, debit: &str, credit: &str, channel: &str) -> CanonicalTransaction {
        let mut t = CanonicalTransaction {
            trans_date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            value_date: None,
            description: description.to_string(),
            debit: debit.parse().unwrap(),
            credit: credit.parse().unwrap(),
            balance: None,
            channel: channel.to_string(),
            transaction_reference: None,
            counterparty: None,
            category: Category::Other,
        };
        t.category = categorize::categorize(description);
        t
    }

    fn sample() -> Snapshot {
        Snapshot::new(vec![
            tx(Some("2025-01-03"), "Transfer to John", "1500", "0", "TRANSFER"),
            tx(Some("2025-01-05"), "Auto-Save to PiggyVest", "100", "0", "TRANSFER"),
            tx(Some("2025-02-01"), "POS Purchase at Shoprite", "2000", "0", "POS"),
            tx(Some("2025-02-10"), "Withdrawal from savings", "0", "40", "TRANSFER"),
            tx(Some("2025-02-14"), "Salary", "0", "250000", "TRANSFER"),
            tx(None, "Mystery charge", "10", "0", "UNKNOWN"),
        ])
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn savings_net_is_outflow_minus_inflow() {
        let transactions = vec![
            tx(Some("2025-01-05"), "Auto-Save weekly", "100", "0", "TRANSFER"),
            tx(Some("2025-01-20"), "PiggyVest withdrawal", "0", "40", "TRANSFER"),
        ];
        assert_eq!(savings_net(&transactions), dec("60"));
    }

    #[test]
    fn savings_net_ignores_month_filter() {
        let snapshot = sample();
        let january = kpis(&snapshot, Some("2025-01"));
        let february = kpis(&snapshot, Some("2025-02"));
        // "Auto-Save" is January, "Withdrawal from savings" is February;
        // both KPI views still see the all-time 100 - 40.
        assert_eq!(january.total_saved, dec("60"));
        assert_eq!(february.total_saved, dec("60"));
    }

    #[test]
    fn kpis_respect_the_month_filter() {
        let snapshot = sample();
        let february = kpis(&snapshot, Some("2025-02"));
        assert_eq!(february.total_spent, dec("2000"));
        assert_eq!(february.total_income, dec("250040"));
        assert_eq!(february.net_flow, dec("248040"));

        let all = kpis(&snapshot, None);
        assert_eq!(all.total_spent, dec("3610"));
    }

    #[test]
    fn category_totals_sort_descending() {
        let snapshot = sample();
        let rows = category_totals(&snapshot.filtered(None));
        let totals: Vec<Decimal> = rows.iter().map(|(_, total)| *total).collect();
        let mut sorted = totals.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(totals, sorted);

        // POS purchase is the single largest debit bucket.
        assert_eq!(rows[0].0, Category::CashWithdrawal);
        assert_eq!(rows[0].1, dec("2000"));
    }

    #[test]
    fn channel_totals_group_by_channel() {
        let snapshot = sample();
        let rows = channel_totals(&snapshot.filtered(None));
        let transfer = rows.iter().find(|(c, _)| c == "TRANSFER").unwrap();
        assert_eq!(transfer.1, dec("1600"));
    }

    #[test]
    fn trend_keys_ascend_and_skip_undated_rows() {
        let snapshot = sample();
        let trend = monthly_trend(snapshot.all());
        let keys: Vec<&str> = trend.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(keys, vec!["2025-01", "2025-02"]);

        for window in trend.windows(2) {
            assert!(window[0].month <= window[1].month);
        }

        // The undated "Mystery charge" debit lands in no bucket.
        let total: Decimal = trend.iter().map(|m| m.debit).sum();
        assert_eq!(total, dec("3600"));
    }

    #[test]
    fn month_keys_are_distinct_and_newest_first() {
        let snapshot = sample();
        assert_eq!(snapshot.month_keys(), vec!["2025-02", "2025-01"]);
    }

    #[test]
    fn month_filter_excludes_undated_rows() {
        let snapshot = sample();
        assert_eq!(snapshot.filtered(Some("2025-01")).len(), 2);
        assert_eq!(snapshot.filtered(Some("2025-03")).len(), 0);
        // No filter keeps everything, undated included.
        assert_eq!(snapshot.filtered(None).len(), 6);
    }

    #[test]
    fn savings_activity_is_newest_first() {
        let snapshot = sample();
        let rows = savings_activity(&snapshot);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description, "Withdrawal from savings");
        assert_eq!(rows[1].description, "Auto-Save to PiggyVest");
    }

    #[test]
    fn empty_snapshot_aggregates_to_nothing() {
        let snapshot = Snapshot::new(vec![]);
        assert!(snapshot.is_empty());
        assert!(snapshot.month_keys().is_empty());
        assert!(category_totals(&snapshot.filtered(None)).is_empty());
        assert_eq!(savings_net(snapshot.all()), Decimal::ZERO);
        let k = kpis(&snapshot, None);
        assert_eq!(k.net_flow, Decimal::ZERO);
    }
}
