//! Totals derived from a list of expenses.
//!
//! These are pure reductions over the output of
//! [list_expenses](crate::expense::list_expenses) and never touch the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::expense::{Category, CategoryFilter, Expense};

/// The totals shown alongside a list of expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    /// Sum of the amounts of the listed expenses, in minor units.
    pub total_minor_units: i128,
    /// Per-category sums, only present when the list is not filtered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_totals: Option<BTreeMap<Category, i128>>,
}

/// Sum the amounts of `expenses`.
///
/// Amounts are `i64` but sums are `i128`, so any realistic number of expenses
/// cannot overflow.
pub fn total_minor_units(expenses: &[Expense]) -> i128 {
    expenses
        .iter()
        .map(|expense| i128::from(expense.amount_minor_units.get()))
        .sum()
}

/// Sum the amounts of `expenses` grouped by category.
///
/// Categories with no expenses are left out.
pub fn category_totals(expenses: &[Expense]) -> BTreeMap<Category, i128> {
    let mut totals = BTreeMap::new();

    for expense in expenses {
        *totals.entry(expense.category).or_insert(0) +=
            i128::from(expense.amount_minor_units.get());
    }

    totals
}

/// Build the summary for a list of expenses that was fetched with `filter`.
///
/// Expenses that do not pass `filter` are ignored. Per-category totals are
/// only computed for [CategoryFilter::All].
pub fn summarize(expenses: &[Expense], filter: &CategoryFilter) -> ExpenseSummary {
    let total_minor_units = expenses
        .iter()
        .filter(|expense| filter.matches(expense))
        .map(|expense| i128::from(expense.amount_minor_units.get()))
        .sum();

    let category_totals = match filter {
        CategoryFilter::All => Some(category_totals(expenses)),
        CategoryFilter::Only(_) => None,
    };

    ExpenseSummary {
        total_minor_units,
        category_totals,
    }
}
