//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    timezone::local_date_today,
    transaction::{
        TransactionDraft, TransactionKind,
        core::create_transaction_batch,
        installments::{InstallmentPolicy, expand_installments},
    },
    user::UserID,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Text detailing the transaction.
    pub description: String,
    /// The category the transaction is filed under.
    pub category: String,
    /// How many monthly installments to record the transaction as.
    #[serde(default)]
    pub installments: Option<u32>,
}

/// A route handler for creating a new transaction, redirects to the
/// transactions view on success.
///
/// When the form asks for more than one installment, the whole series is
/// stored in one atomic batch.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    if form.amount <= 0.0 {
        tracing::error!("Tried to create a transaction with amount {}", form.amount);

        return Error::NonPositiveAmount(form.amount).into_alert_response();
    }

    let today = match local_date_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    if form.date > today {
        tracing::error!(
            "Tried to perform an operation with a future date (e.g., create a transaction)"
        );

        return Error::FutureDate(form.date).into_alert_response();
    }

    let draft = TransactionDraft {
        kind: form.kind,
        amount: form.amount,
        category: form.category,
        date: form.date,
        description: form.description,
    };
    let count = form.installments.unwrap_or(1);
    let drafts = expand_installments(&draft, count, InstallmentPolicy::default());

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_transaction_batch(drafts, user_id, &mut connection) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
