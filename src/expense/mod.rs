//! Expense recording, listing and totals.

mod aggregation;
mod category;
mod create;
mod db;
mod domain;
mod get;
mod list;
mod summary;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

pub use aggregation::{ExpenseSummary, category_totals, summarize, total_minor_units};
pub use category::get_categories_endpoint;
pub use create::{CreateExpenseForm, CreateExpenseResponse, create_expense_endpoint};
pub use db::{
    CreateOutcome, count_expenses, create_expense, create_expense_table, get_expense,
    list_expenses,
};
pub use domain::{
    AmountMinorUnits, Category, CategoryFilter, Expense, ExpenseDescription, ExpenseId,
    IdempotencyKey, NewExpense, ValidationError,
};
pub use get::get_expense_endpoint;
pub use list::{CategoryQuery, list_expenses_endpoint};
pub use summary::get_summary_endpoint;

/// The state needed by the expense endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
