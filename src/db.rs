//! Creates the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, expense::create_expense_table};

/// Create the all of the database tables for the application.
///
/// Safe to call on an existing database, tables and indexes that already
/// exist are left untouched.
///
/// # Errors
/// This function may return an [Error::SqlError] if an SQL error occurred.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_expense_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_twice_succeeds() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        assert_eq!(initialize(&connection), Ok(()));
    }

    #[test]
    fn initialize_creates_indexes() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let mut indexes: Vec<String> = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'expense'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        indexes.sort();

        assert!(indexes.contains(&"idx_expense_date".to_owned()));
        assert!(indexes.contains(&"idx_expense_category_date".to_owned()));
        // The UNIQUE constraint on the idempotency key creates an automatic index.
        assert!(
            indexes
                .iter()
                .any(|name| name.starts_with("sqlite_autoindex_expense")),
            "got {indexes:?}"
        );
    }
}
