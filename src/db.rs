//! Creates the application's database tables.

use rusqlite::Connection;

use crate::{Error, transaction::create_transaction_table, user::create_user_table};

/// Create the application's tables if they do not exist.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    create_user_table(connection)?;
    create_transaction_table(connection)?;

    Ok(())
}

/// An in-memory database with the application tables, for tests.
#[cfg(test)]
pub fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");
    initialize(&connection).expect("Could not create application tables");

    connection
}
