//! Database operations for expenses.

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    expense::{
        AmountMinorUnits, CategoryFilter, Expense, ExpenseDescription, ExpenseId, IdempotencyKey,
        NewExpense, ValidationError,
    },
};

const SELECT_EXPENSE_COLUMNS: &str = "SELECT id, amount_minor_units, category, description, date, \
    idempotency_key, created_at FROM expense";

/// The result of [create_expense].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new expense was inserted.
    Created(ExpenseId),
    /// An expense with the same idempotency key already existed, nothing was
    /// inserted.
    Existing(ExpenseId),
}

impl CreateOutcome {
    /// The ID of the expense that holds the idempotency key.
    pub fn id(self) -> ExpenseId {
        match self {
            CreateOutcome::Created(id) | CreateOutcome::Existing(id) => id,
        }
    }

    /// Whether this call inserted the expense.
    pub fn was_created(self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}

/// Create an expense unless one with the same idempotency key already exists.
///
/// Repeating a call with the same key returns the ID of the first expense and
/// leaves it unchanged, even if the other fields differ.
///
/// Two callers racing with the same key can both miss the initial lookup. The
/// `UNIQUE` constraint on the key rejects the second insert, which is then
/// answered with the winner's ID.
///
/// # Errors
/// This function will return a:
/// - [Error::StoreUnavailable] if the database is busy or locked,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(
    new_expense: NewExpense,
    connection: &Connection,
) -> Result<CreateOutcome, Error> {
    if let Some(id) = get_expense_id_by_idempotency_key(&new_expense.idempotency_key, connection)?
    {
        tracing::info!(
            "Expense with idempotency key {} already exists, returning ID {id}",
            new_expense.idempotency_key
        );
        return Ok(CreateOutcome::Existing(id));
    }

    let insert_result = connection
        .prepare(
            "INSERT INTO expense (amount_minor_units, category, description, date, idempotency_key, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id",
        )?
        .query_row(
            (
                new_expense.amount_minor_units.get(),
                new_expense.category,
                new_expense.description.as_ref(),
                new_expense.date,
                new_expense.idempotency_key.as_ref(),
                OffsetDateTime::now_utc(),
            ),
            |row| row.get(0),
        );

    match insert_result {
        Ok(id) => Ok(CreateOutcome::Created(id)),
        Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        )) => {
            tracing::warn!(
                "Lost insert race for idempotency key {}, returning the existing expense",
                new_expense.idempotency_key
            );

            get_expense_id_by_idempotency_key(&new_expense.idempotency_key, connection)?
                .map(CreateOutcome::Existing)
                .ok_or(Error::NotFound)
        }
        Err(error) => Err(error.into()),
    }
}

/// Look up the ID of the expense holding `key`, if any.
///
/// Uses the unique index on the key column. Keys are compared exactly.
///
/// # Errors
/// This function will return a:
/// - [Error::StoreUnavailable] if the database is busy or locked,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_expense_id_by_idempotency_key(
    key: &IdempotencyKey,
    connection: &Connection,
) -> Result<Option<ExpenseId>, Error> {
    connection
        .prepare("SELECT id FROM expense WHERE idempotency_key = ?1")?
        .query_row([key.as_ref()], |row| row.get(0))
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve an expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(&format!("{SELECT_EXPENSE_COLUMNS} WHERE id = :id"))?
        .query_one(&[(":id", &id)], map_expense_row)?;

    Ok(expense)
}

/// Retrieve every expense that passes `filter`, most recent date first.
///
/// Expenses on the same date are ordered by when they were stored, newest
/// first, so the order is stable for a given set of rows.
pub fn list_expenses(
    filter: CategoryFilter,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    const ORDER_CLAUSE: &str = "ORDER BY date DESC, created_at DESC, id DESC";

    let expenses = match filter {
        CategoryFilter::All => connection
            .prepare(&format!("{SELECT_EXPENSE_COLUMNS} {ORDER_CLAUSE}"))?
            .query_map([], map_expense_row)?
            .collect::<Result<Vec<_>, _>>(),
        CategoryFilter::Only(category) => connection
            .prepare(&format!(
                "{SELECT_EXPENSE_COLUMNS} WHERE category = ?1 {ORDER_CLAUSE}"
            ))?
            .query_map([category], map_expense_row)?
            .collect::<Result<Vec<_>, _>>(),
    }?;

    Ok(expenses)
}

/// Get the total number of expenses in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_expenses(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM expense;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the expense table and its indexes.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount_minor_units INTEGER NOT NULL CHECK (amount_minor_units > 0),
            category TEXT NOT NULL,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            idempotency_key TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date, created_at);
        CREATE INDEX IF NOT EXISTS idx_expense_category_date ON expense(category, date);",
    )?;

    Ok(())
}

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_amount: i64 = row.get(1)?;
    let category = row.get(2)?;
    let raw_description: String = row.get(3)?;
    let date = row.get(4)?;
    let raw_key: String = row.get(5)?;
    let created_at = row.get(6)?;

    let invalid_column = |index: usize, error: ValidationError| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    };

    Ok(Expense {
        id,
        amount_minor_units: AmountMinorUnits::new(raw_amount)
            .map_err(|error| invalid_column(1, error))?,
        category,
        description: ExpenseDescription::new(&raw_description)
            .map_err(|error| invalid_column(3, error))?,
        date,
        idempotency_key: IdempotencyKey::new(&raw_key).map_err(|error| invalid_column(5, error))?,
        created_at,
    })
}
