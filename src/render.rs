use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, Table, TableComponent};
use rust_decimal::Decimal;

use crate::categorize::Category;
use crate::report::{Kpis, MonthlyTotals};
use crate::transaction::CanonicalTransaction;

fn new_table() -> Table {
    let mut table = Table::new();
    table.remove_style(TableComponent::HorizontalLines);
    table.remove_style(TableComponent::MiddleIntersections);
    table.remove_style(TableComponent::LeftBorderIntersections);
    table.remove_style(TableComponent::RightBorderIntersections);
    table
}

pub(crate) fn print_kpis(kpis: &Kpis) {
    let mut table = new_table();
    table.set_header(vec![
        "Total Spent",
        "Total Income",
        "Net Flow",
        "Total Saved (All Time)",
    ]);
    table.add_row(vec![
        amount_cell(kpis.total_spent),
        amount_cell(kpis.total_income),
        amount_cell(kpis.net_flow),
        amount_cell(kpis.total_saved),
    ]);
    println!("{table}");
}

pub(crate) fn print_category_totals(rows: &[(Category, Decimal)]) {
    let mut table = new_table();
    table.set_header(vec!["Category", "Total Debit"]);
    for (category, total) in rows {
        table.add_row(vec![Cell::new(category.label()), amount_cell(*total)]);
    }
    println!("{table}");
}

pub(crate) fn print_channel_totals(rows: &[(String, Decimal)]) {
    let mut table = new_table();
    table.set_header(vec!["Channel", "Total Debit"]);
    for (channel, total) in rows {
        table.add_row(vec![Cell::new(channel.as_str()), amount_cell(*total)]);
    }
    println!("{table}");
}

pub(crate) fn print_monthly_trend(rows: &[MonthlyTotals]) {
    let mut table = new_table();
    table.set_header(vec!["Month", "Debit", "Credit"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.month.as_str()),
            amount_cell(row.debit),
            amount_cell(row.credit),
        ]);
    }
    println!("{table}");
}

pub(crate) fn print_transactions(rows: &[&CanonicalTransaction]) {
    let mut table = new_table();
    table.set_header(vec![
        "Date",
        "Description",
        "Debit",
        "Credit",
        "Category",
        "Channel",
        "Counterparty",
    ]);
    for t in rows {
        table.add_row(vec![
            Cell::new(format_date(t.trans_date).as_str()),
            Cell::new(t.description.as_str()),
            amount_cell(t.debit),
            amount_cell(t.credit),
            Cell::new(t.category.label()),
            Cell::new(t.channel.as_str()),
            Cell::new(t.counterparty.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
}

fn amount_cell(amount: Decimal) -> Cell {
    Cell::new(format_amount(amount).as_str()).set_alignment(CellAlignment::Right)
}

/// Format a ₦ amount.
fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}
