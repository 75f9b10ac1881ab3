//! The endpoint for listing expenses.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::lock_connection,
    expense::{CategoryFilter, ExpenseState, list_expenses},
};

/// The query string accepted by the list and summary endpoints.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CategoryQuery {
    /// A category name, or "All" for every category.
    pub category: Option<String>,
}

impl CategoryQuery {
    pub(crate) fn filter(&self) -> Result<CategoryFilter, Error> {
        CategoryFilter::from_param(self.category.as_deref()).map_err(Error::from)
    }
}

/// A route handler that returns the expenses in the requested category as a
/// JSON array, most recent date first.
pub async fn list_expenses_endpoint(
    State(state): State<ExpenseState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Response, Error> {
    let filter = query.filter()?;
    let connection = lock_connection(&state.db_connection)?;

    let expenses = list_expenses(filter, &connection)?;
    tracing::debug!("Listing {} expenses for {filter:?}", expenses.len());

    Ok(Json(expenses).into_response())
}
