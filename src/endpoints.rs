//! The API endpoints URIs.

/// The route for listing (GET) and creating (POST) expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route for a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route for the totals of the listed expenses.
pub const EXPENSES_SUMMARY: &str = "/api/expenses/summary";
/// The route for the list of categories an expense can belong to.
pub const CATEGORIES: &str = "/api/categories";

/// Replace the `{expense_id}` parameter in [EXPENSE] with `expense_id`.
pub fn format_expense_endpoint(expense_id: i64) -> String {
    EXPENSE.replace("{expense_id}", &expense_id.to_string())
}
