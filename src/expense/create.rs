//! The endpoint for recording an expense.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::lock_connection,
    expense::{CreateOutcome, ExpenseId, ExpenseState, NewExpense, create_expense},
};

/// The JSON body of a create request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExpenseForm {
    /// The amount in minor currency units, e.g. 1050 for 10.50.
    pub amount_minor_units: i64,
    /// One of the category names, e.g. "Food".
    pub category: String,
    /// What the money was spent on.
    pub description: String,
    /// The date in the form `YYYY-MM-DD`.
    pub date: String,
    /// A token generated by the client for each distinct submission.
    pub idempotency_key: String,
}

/// The JSON body of a successful create response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateExpenseResponse {
    /// The ID of the expense holding the request's idempotency key.
    pub id: ExpenseId,
    /// `false` when the idempotency key had already been used and nothing new
    /// was stored.
    pub created: bool,
}

/// A route handler for creating an expense.
///
/// Responds with `201 Created` when a new expense was stored and `200 OK` when
/// the request repeats an idempotency key that was already used. Both carry
/// the ID of the stored expense.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    Json(form): Json<CreateExpenseForm>,
) -> Result<Response, Error> {
    let new_expense = NewExpense::new(
        form.amount_minor_units,
        &form.category,
        &form.description,
        &form.date,
        &form.idempotency_key,
    )
    .inspect_err(|error| tracing::debug!("Rejected create expense request: {error}"))?;

    let connection = lock_connection(&state.db_connection)?;
    let outcome = create_expense(new_expense, &connection)?;

    let status = match outcome {
        CreateOutcome::Created(id) => {
            tracing::info!("Created expense {id}");
            StatusCode::CREATED
        }
        CreateOutcome::Existing(_) => StatusCode::OK,
    };

    let body = CreateExpenseResponse {
        id: outcome.id(),
        created: outcome.was_created(),
    };

    Ok((status, Json(body)).into_response())
}
