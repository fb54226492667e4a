//! Totals and breakdowns over ledger snapshots.
//!
//! Every function is pure and treats an empty input as zero or empty.

use std::collections::BTreeMap;

use time::Date;

use crate::models::{Category, Direction, Expense, LedgerEntry, Status};

pub fn total_expenses(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|expense| expense.amount).sum()
}

/// Sum of entries in `direction`, restricted to `status` when given.
pub fn total_by_direction(
    entries: &[LedgerEntry],
    direction: Direction,
    status: Option<Status>,
) -> f64 {
    entries
        .iter()
        .filter(|entry| entry.direction == direction)
        .filter(|entry| status.is_none_or(|status| entry.status == status))
        .map(|entry| entry.amount)
        .sum()
}

/// Number of pending entries across both directions.
pub fn pending_count(entries: &[LedgerEntry]) -> usize {
    entries.iter().filter(|entry| entry.is_pending()).count()
}

/// Amount per category, in the order each category first appears.
pub fn by_category(expenses: &[Expense]) -> Vec<(Category, f64)> {
    let mut totals: Vec<(Category, f64)> = Vec::new();

    for expense in expenses {
        match totals
            .iter_mut()
            .find(|(category, _)| *category == expense.category)
        {
            Some((_, total)) => *total += expense.amount,
            None => totals.push((expense.category, expense.amount)),
        }
    }

    totals
}

/// Amount per calendar date, iterating oldest date first.
pub fn by_date(expenses: &[Expense]) -> BTreeMap<Date, f64> {
    let mut totals = BTreeMap::new();

    for expense in expenses {
        *totals.entry(expense.date).or_insert(0.0) += expense.amount;
    }

    totals
}

/// Pending money owed to the principal minus pending money they owe.
pub fn net_balance(entries: &[LedgerEntry]) -> f64 {
    total_by_direction(entries, Direction::Lent, Some(Status::Pending))
        - total_by_direction(entries, Direction::Borrowed, Some(Status::Pending))
}

/// Lent and borrowed totals regardless of status.
pub fn direction_totals(entries: &[LedgerEntry]) -> (f64, f64) {
    (
        total_by_direction(entries, Direction::Lent, None),
        total_by_direction(entries, Direction::Borrowed, None),
    )
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_expenses: f64,
    pub pending_lent: f64,
    pub pending_borrowed: f64,
    /// Pending lent plus pending borrowed.
    pub pending_returns: f64,
    pub pending_count: usize,
    pub net_balance: f64,
    pub lent_total: f64,
    pub borrowed_total: f64,
}

impl DashboardSummary {
    pub fn from_snapshots(expenses: &[Expense], entries: &[LedgerEntry]) -> Self {
        let pending_lent = total_by_direction(entries, Direction::Lent, Some(Status::Pending));
        let pending_borrowed =
            total_by_direction(entries, Direction::Borrowed, Some(Status::Pending));
        let (lent_total, borrowed_total) = direction_totals(entries);

        Self {
            total_expenses: total_expenses(expenses),
            pending_lent,
            pending_borrowed,
            pending_returns: pending_lent + pending_borrowed,
            pending_count: pending_count(entries),
            net_balance: pending_lent - pending_borrowed,
            lent_total,
            borrowed_total,
        }
    }
}
