//! The endpoint for the totals of the listed expenses.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    app_state::lock_connection,
    expense::{CategoryQuery, ExpenseState, list_expenses, summarize},
};

/// A route handler that returns the total of the expenses in the requested
/// category, plus per-category totals when no category is selected.
pub async fn get_summary_endpoint(
    State(state): State<ExpenseState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Response, Error> {
    let filter = query.filter()?;
    let connection = lock_connection(&state.db_connection)?;

    let expenses = list_expenses(filter, &connection)?;

    Ok(Json(summarize(&expenses, &filter)).into_response())
}
