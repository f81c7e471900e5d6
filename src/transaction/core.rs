//! The transaction model and its database operations.

use rusqlite::{Connection, Row, types::Type};
use serde::Deserialize;
use time::Date;

use crate::{Error, user::UserID};

/// The ID of a transaction in the database.
pub type TransactionID = i64;

/// Whether a transaction adds money to the account or takes it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in (salary, gifts, etc.).
    Income,
    /// Money going out.
    Expense,
}

impl TransactionKind {
    /// The string stored in the database for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

/// An amount of money that a user spent or received on a given date.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction in the database.
    pub id: TransactionID,
    /// The ID of the user that created the transaction.
    pub user_id: UserID,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The dollar amount, always greater than zero.
    pub amount: f64,
    /// The category the user filed the transaction under.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
}

impl Transaction {
    /// The amount with its sign applied: positive for income, negative for
    /// expenses. Summing signed amounts gives the account balance.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// The data needed to create a transaction, before it has an ID or an owner.
///
/// Drafts are what the installment expander works on: expanding a draft
/// produces more drafts, and only the insert ties them to a user.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The dollar amount, always greater than zero.
    pub amount: f64,
    /// The category the user filed the transaction under.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
}

/// Store a single transaction for `user_id` in the database.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn create_transaction(
    draft: TransactionDraft,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, kind, amount, category, date, description) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
            RETURNING id, user_id, kind, amount, category, date, description",
        )?
        .query_row(
            (
                user_id.as_i64(),
                draft.kind.as_str(),
                draft.amount,
                &draft.category,
                draft.date,
                &draft.description,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Store all of `drafts` for `user_id` in one atomic database transaction.
///
/// Either every draft is inserted or none of them are, so a three-part
/// installment can never end up with only two parts in the database.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn create_transaction_batch(
    drafts: Vec<TransactionDraft>,
    user_id: UserID,
    connection: &mut Connection,
) -> Result<Vec<Transaction>, Error> {
    let sql_transaction = connection.transaction()?;
    let mut transactions = Vec::with_capacity(drafts.len());

    {
        let mut statement = sql_transaction.prepare(
            "INSERT INTO \"transaction\" (user_id, kind, amount, category, date, description) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
            RETURNING id, user_id, kind, amount, category, date, description",
        )?;

        for draft in drafts {
            let transaction = statement.query_row(
                (
                    user_id.as_i64(),
                    draft.kind.as_str(),
                    draft.amount,
                    &draft.category,
                    draft.date,
                    &draft.description,
                ),
                map_transaction_row,
            )?;

            transactions.push(transaction);
        }
    }

    sql_transaction.commit()?;

    Ok(transactions)
}

/// Retrieve all of `user_id`'s transactions, oldest first.
///
/// Ties on the date keep their insertion order.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn get_transactions_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, amount, category, date, description \
            FROM \"transaction\" WHERE user_id = ?1 \
            ORDER BY date ASC, id ASC",
        )?
        .query_map([user_id.as_i64()], map_transaction_row)?
        .map(|transaction| transaction.map_err(Error::from))
        .collect()
}

/// Delete the transaction `id` if it belongs to `user_id`.
///
/// # Errors
/// Returns an [Error::DeleteMissingTransaction] if the transaction does not
/// exist or belongs to another user, or an [Error::SqlError] if there is an
/// unexpected SQL error.
pub fn delete_transaction(
    id: TransactionID,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    match rows_affected {
        0 => Err(Error::DeleteMissingTransaction),
        _ => Ok(()),
    }
}

/// Count how many transactions `user_id` has.
#[cfg(test)]
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<usize, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    Ok(count as usize)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (\
            id INTEGER PRIMARY KEY AUTOINCREMENT, \
            user_id INTEGER NOT NULL REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE, \
            kind TEXT NOT NULL, \
            amount REAL NOT NULL, \
            category TEXT NOT NULL, \
            date TEXT NOT NULL, \
            description TEXT NOT NULL\
        ); \
        CREATE INDEX IF NOT EXISTS idx_transaction_user_date \
            ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
///
/// The query must select the columns id, user_id, kind, amount, category,
/// date, description in that order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let kind_text: String = row.get(2)?;
    let kind = match kind_text.as_str() {
        "income" => TransactionKind::Income,
        "expense" => TransactionKind::Expense,
        _ => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                format!("unknown transaction kind {kind_text}").into(),
            ));
        }
    };

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        kind,
        amount: row.get(3)?,
        category: row.get(4)?,
        date: row.get(5)?,
        description: row.get(6)?,
    })
}

#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error,
        db::get_test_connection,
        transaction::{
            TransactionDraft, TransactionKind, count_transactions, create_transaction,
            create_transaction_batch, get_transactions_for_user,
        },
        user::{UserID, create_user},
    };

    use super::delete_transaction;

    fn get_test_user_id(connection: &rusqlite::Connection) -> UserID {
        create_user(
            "Test User",
            "test@test.com",
            None,
            crate::PasswordHash::new_unchecked("hunter2"),
            connection,
        )
        .expect("could not create test user")
        .id
    }

    fn sample_draft() -> TransactionDraft {
        TransactionDraft {
            kind: TransactionKind::Expense,
            amount: 12.3,
            category: "Food".to_string(),
            date: date!(2024 - 03 - 05),
            description: "weekly groceries".to_string(),
        }
    }

    #[test]
    fn create_transaction_returns_stored_fields() {
        let connection = get_test_connection();
        let user_id = get_test_user_id(&connection);
        let draft = sample_draft();

        let transaction = create_transaction(draft.clone(), user_id, &connection)
            .expect("could not create transaction");

        assert_eq!(transaction.user_id, user_id);
        assert_eq!(transaction.kind, draft.kind);
        assert_eq!(transaction.amount, draft.amount);
        assert_eq!(transaction.category, draft.category);
        assert_eq!(transaction.date, draft.date);
        assert_eq!(transaction.description, draft.description);
    }

    #[test]
    fn create_transaction_batch_stores_all_drafts() {
        let mut connection = get_test_connection();
        let user_id = get_test_user_id(&connection);
        let drafts = vec![sample_draft(), sample_draft(), sample_draft()];

        let transactions = create_transaction_batch(drafts, user_id, &mut connection)
            .expect("could not create transactions");

        assert_eq!(transactions.len(), 3);
        assert_eq!(
            count_transactions(user_id, &connection).expect("could not count transactions"),
            3
        );
    }

    #[test]
    fn get_transactions_returns_oldest_first() {
        let connection = get_test_connection();
        let user_id = get_test_user_id(&connection);
        for date in [
            date!(2024 - 06 - 15),
            date!(2024 - 01 - 02),
            date!(2024 - 03 - 05),
        ] {
            let draft = TransactionDraft {
                date,
                ..sample_draft()
            };
            create_transaction(draft, user_id, &connection).expect("could not create transaction");
        }

        let transactions =
            get_transactions_for_user(user_id, &connection).expect("could not get transactions");

        let dates: Vec<_> = transactions
            .iter()
            .map(|transaction| transaction.date)
            .collect();
        assert_eq!(
            dates,
            vec![
                date!(2024 - 01 - 02),
                date!(2024 - 03 - 05),
                date!(2024 - 06 - 15)
            ]
        );
    }

    #[test]
    fn get_transactions_does_not_return_other_users_transactions() {
        let connection = get_test_connection();
        let user_id = get_test_user_id(&connection);
        let other_user_id = create_user(
            "Other User",
            "other@test.com",
            None,
            crate::PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("could not create test user")
        .id;
        create_transaction(sample_draft(), other_user_id, &connection)
            .expect("could not create transaction");

        let transactions =
            get_transactions_for_user(user_id, &connection).expect("could not get transactions");

        assert!(transactions.is_empty());
    }

    #[test]
    fn delete_transaction_removes_row() {
        let connection = get_test_connection();
        let user_id = get_test_user_id(&connection);
        let transaction = create_transaction(sample_draft(), user_id, &connection)
            .expect("could not create transaction");

        delete_transaction(transaction.id, user_id, &connection)
            .expect("could not delete transaction");

        assert_eq!(
            count_transactions(user_id, &connection).expect("could not count transactions"),
            0
        );
    }

    #[test]
    fn delete_transaction_fails_for_other_users_transaction() {
        let connection = get_test_connection();
        let user_id = get_test_user_id(&connection);
        let other_user_id = create_user(
            "Other User",
            "other@test.com",
            None,
            crate::PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("could not create test user")
        .id;
        let transaction = create_transaction(sample_draft(), other_user_id, &connection)
            .expect("could not create transaction");

        let result = delete_transaction(transaction.id, user_id, &connection);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert_eq!(
            count_transactions(other_user_id, &connection).expect("could not count transactions"),
            1
        );
    }

    #[test]
    fn signed_amount_flips_sign_for_expenses() {
        let connection = get_test_connection();
        let user_id = get_test_user_id(&connection);
        let expense = create_transaction(sample_draft(), user_id, &connection)
            .expect("could not create transaction");
        let income = create_transaction(
            TransactionDraft {
                kind: TransactionKind::Income,
                ..sample_draft()
            },
            user_id,
            &connection,
        )
        .expect("could not create transaction");

        assert_eq!(expense.signed_amount(), -12.3);
        assert_eq!(income.signed_amount(), 12.3);
    }
}
