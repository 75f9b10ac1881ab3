//! Expense Ledger is a small data service for tracking personal expenses.
//!
//! The library exposes two core operations over a SQLite store: listing
//! expenses (optionally filtered by category, newest first) and creating an
//! expense exactly once per client-generated idempotency key. A JSON API built
//! with axum fronts both operations.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod db;
pub mod endpoints;
mod expense;
mod logging;
mod routing;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use expense::{
    AmountMinorUnits, Category, CategoryFilter, CreateExpenseForm, CreateExpenseResponse,
    CreateOutcome, Expense, ExpenseDescription, ExpenseId, ExpenseSummary, IdempotencyKey,
    NewExpense, ValidationError, category_totals, count_expenses, create_expense, get_expense,
    list_expenses, summarize, total_minor_units,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The input to an operation was malformed.
    ///
    /// Validation happens before the store is touched, so no record has been
    /// read or written when this error is returned.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The store could not be reached, e.g. the database lock is poisoned or
    /// SQLite reported that the database is busy or locked.
    ///
    /// Callers may retry the request. Retrying a create with the same
    /// idempotency key is always safe.
    #[error("the expense store is unavailable: {0}")]
    StoreUnavailable(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: rusqlite::ffi::ErrorCode::DatabaseBusy
                        | rusqlite::ffi::ErrorCode::DatabaseLocked,
                    extended_code: _,
                },
                ref description,
            ) => {
                tracing::warn!("the database is busy: {description:?}");
                Error::StoreUnavailable(value.to_string())
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::Validation(error) => (StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "the requested resource could not be found".to_owned(),
            ),
            Error::StoreUnavailable(ref reason) => {
                tracing::error!("The expense store is unavailable: {reason}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The expense store is unavailable, please try again.".to_owned(),
                )
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
