//! Defines the route handler for the page that displays transactions as a table.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    dashboard::{PeriodFilter, PeriodQuery, filter_bar},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency, link,
    },
    navigation::NavBar,
    timezone::local_date_today,
    transaction::{Transaction, TransactionKind, core::get_transactions_for_user},
    user::UserID,
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render an overview of the user's transactions, most recent first.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_for_user(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
    drop(connection);

    let filter = query.filter();
    let filtered = filter.apply(&transactions);

    let this_year = local_date_today(&state.local_timezone)?.year();
    let mut years: Vec<i32> = transactions
        .iter()
        .map(|transaction| transaction.date.year())
        .chain(std::iter::once(this_year))
        .collect();
    years.sort_unstable();
    years.dedup();

    Ok(transactions_view(&filter, &years, &filtered).into_response())
}

fn transactions_view(filter: &PeriodFilter, years: &[i32], transactions: &[Transaction]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
            max-w-screen-xl text-gray-900 dark:text-white"
        {
            div class="w-full flex justify-between items-baseline mb-4"
            {
                h2 class="text-xl font-bold" { "Transactions" }

                a
                    href=(endpoints::NEW_TRANSACTION_VIEW)
                    class=(LINK_STYLE)
                {
                    "New Transaction"
                }
            }

            (filter_bar(endpoints::TRANSACTIONS_VIEW, filter, years))

            @if transactions.is_empty() {
                p {
                    "Nothing here yet. "
                    (link(endpoints::NEW_TRANSACTION_VIEW, "Add a transaction"))
                    " to get started, or widen the filter above."
                }
            } @else {
                (transaction_table(transactions))
            }
        }
    );

    base("Transactions", &[], &content)
}

fn transaction_table(transactions: &[Transaction]) -> Markup {
    html!(
        div class="w-full relative overflow-x-auto shadow-md rounded"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for transaction in transactions.iter().rev() {
                        (transaction_row(transaction))
                    }
                }
            }
        }
    )
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let amount_style = match transaction.kind {
        TransactionKind::Income => "text-green-600 dark:text-green-400",
        TransactionKind::Expense => "text-red-600 dark:text-red-400",
    };
    let delete_endpoint = format_endpoint(endpoints::TRANSACTION, transaction.id);

    html!(
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE) { (transaction.category) }
            td class=(format!("{TABLE_CELL_STYLE} {amount_style}"))
            {
                (format_currency(transaction.signed_amount()))
            }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    hx-delete=(delete_endpoint)
                    hx-target="closest tr"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    hx-confirm="Are you sure you want to delete this transaction?"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        response::Response,
    };
    use rusqlite::Connection;
    use scraper::{ElementRef, Html, Selector};
    use time::macros::date;

    use crate::{
        dashboard::PeriodQuery,
        db::initialize,
        endpoints::{self, format_endpoint},
        transaction::{TransactionDraft, TransactionKind, create_transaction},
        user::{UserID, create_user},
    };

    use super::{TransactionsViewState, get_transactions_page};

    fn get_test_state() -> (TransactionsViewState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let user = create_user(
            "Test User",
            "test@test.com",
            None,
            crate::PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let state = TransactionsViewState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (state, user.id)
    }

    fn insert(
        state: &TransactionsViewState,
        user_id: UserID,
        amount: f64,
        date: time::Date,
        description: &str,
    ) -> i64 {
        let connection = state.db_connection.lock().unwrap();
        create_transaction(
            TransactionDraft {
                kind: TransactionKind::Expense,
                amount,
                category: "Food".to_owned(),
                date,
                description: description.to_owned(),
            },
            user_id,
            &connection,
        )
        .unwrap()
        .id
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }

    async fn parse_html(response: Response) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    fn transaction_rows(html: &Html) -> Vec<ElementRef<'_>> {
        let row_selector = Selector::parse("tbody tr[data-transaction-row='true']").unwrap();
        html.select(&row_selector).collect()
    }

    #[tokio::test]
    async fn transactions_page_lists_most_recent_first() {
        let (state, user_id) = get_test_state();
        insert(&state, user_id, 1.0, date!(2024 - 03 - 01), "first");
        insert(&state, user_id, 2.0, date!(2024 - 03 - 15), "second");

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(PeriodQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);

        let rows = transaction_rows(&html);
        assert_eq!(rows.len(), 2);

        let first_row_text = rows[0].text().collect::<String>();
        assert!(
            first_row_text.contains("second"),
            "most recent transaction should be listed first, got {first_row_text}"
        );
    }

    #[tokio::test]
    async fn rows_have_delete_buttons_for_their_transaction() {
        let (state, user_id) = get_test_state();
        let id = insert(&state, user_id, 1.0, date!(2024 - 03 - 01), "only");

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(PeriodQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html(response).await;
        let button_selector = Selector::parse("button[hx-delete]").unwrap();
        let button = html
            .select(&button_selector)
            .next()
            .expect("no delete button found");

        assert_eq!(
            button.value().attr("hx-delete"),
            Some(format_endpoint(endpoints::TRANSACTION, id).as_str())
        );
        assert_eq!(button.value().attr("hx-target"), Some("closest tr"));
    }

    #[tokio::test]
    async fn search_filter_narrows_the_table() {
        let (state, user_id) = get_test_state();
        insert(&state, user_id, 1.0, date!(2024 - 03 - 01), "groceries");
        insert(&state, user_id, 2.0, date!(2024 - 03 - 15), "petrol");

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(PeriodQuery {
                month: None,
                year: None,
                search: Some("petrol".to_owned()),
            }),
        )
        .await
        .unwrap();

        let html = parse_html(response).await;
        let rows = transaction_rows(&html);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].text().collect::<String>().contains("petrol"));
    }

    #[tokio::test]
    async fn empty_table_shows_a_prompt() {
        let (state, user_id) = get_test_state();

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(PeriodQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);
        assert!(transaction_rows(&html).is_empty());
        assert!(html.html().contains("Nothing here yet."));
    }
}
