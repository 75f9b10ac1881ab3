//! The endpoint for fetching a single expense.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    app_state::lock_connection,
    expense::{ExpenseId, ExpenseState, get_expense},
};

/// A route handler for getting an expense by its database ID.
///
/// Responds with `404 Not Found` if there is no expense with that ID.
pub async fn get_expense_endpoint(
    State(state): State<ExpenseState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_expense(expense_id, &connection).map(|expense| Json(expense).into_response())
}
