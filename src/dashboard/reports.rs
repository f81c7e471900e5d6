//! The income and expense detail pages.
//!
//! Both pages show the same thing from opposite directions: a ranked table of
//! categories for the selected period with a pie chart alongside. They share
//! the dashboard's period filter, so a month picked on the dashboard can be
//! carried straight over via the URL.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    dashboard::{
        categories::{CategoryBucket, ranked_category_buckets},
        charts::{DashboardChart, charts_script, charts_view, expense_pie_chart},
        filter::PeriodFilter,
        handlers::{DashboardState, PeriodQuery, filter_bar, period_label},
    },
    endpoints,
    html::{
        HeadElement, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    timezone::local_date_today,
    transaction::{TransactionKind, get_transactions_for_user},
    user::UserID,
};

/// Display the income breakdown by category.
pub async fn get_income_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, Error> {
    get_report_page(state, user_id, query, TransactionKind::Income).await
}

/// Display the expense breakdown by category.
pub async fn get_expenses_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, Error> {
    get_report_page(state, user_id, query, TransactionKind::Expense).await
}

async fn get_report_page(
    state: DashboardState,
    user_id: UserID,
    query: PeriodQuery,
    kind: TransactionKind,
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
    let buckets = ranked_category_buckets(kind, &filtered);

    let this_year = local_date_today(&state.local_timezone)?.year();
    let mut years: Vec<i32> = transactions
        .iter()
        .map(|transaction| transaction.date.year())
        .chain(std::iter::once(this_year))
        .collect();
    years.sort_unstable();
    years.dedup();

    Ok(report_view(kind, &filter, &years, &buckets).into_response())
}

fn report_view(
    kind: TransactionKind,
    filter: &PeriodFilter,
    years: &[i32],
    buckets: &[CategoryBucket],
) -> Markup {
    let (title, endpoint) = match kind {
        TransactionKind::Income => ("Income", endpoints::INCOME_VIEW),
        TransactionKind::Expense => ("Expenses", endpoints::EXPENSES_VIEW),
    };
    let nav_bar = NavBar::new(endpoint).into_html();
    let label = period_label(filter);

    let charts = [DashboardChart {
        id: "category-pie-chart",
        options: expense_pie_chart(&label, buckets).to_string(),
    }];

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
            max-w-screen-xl text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold mb-4" { (title) " by category" }

            (filter_bar(endpoint, filter, years))

            @if buckets.is_empty() {
                p {
                    "No " (title.to_lowercase()) " recorded for " (label) "."
                }
            } @else {
                (charts_view(&charts))

                (category_table(buckets))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&charts),
    ];

    base(title, &scripts, &content)
}

fn category_table(buckets: &[CategoryBucket]) -> Markup {
    let total: f64 = buckets.iter().map(|bucket| bucket.total).sum();

    html!(
        div class="w-full relative overflow-x-auto shadow-md rounded"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                    }
                }

                tbody
                {
                    @for bucket in buckets {
                        @let share =
                            if total > 0.0 { (bucket.total / total * 100.0).round() as i64 } else { 0 };

                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                span class="inline-flex items-center gap-2"
                                {
                                    span
                                        class="inline-block h-3 w-3 rounded-full"
                                        style=(format!("background-color: {}", bucket.color))
                                    {}
                                    (bucket.category)
                                }
                            }
                            td class=(TABLE_CELL_STYLE) { (format_currency(bucket.total)) }
                            td class=(TABLE_CELL_STYLE) { (share) "%" }
                        }
                    }
                }
            }
        }
    )
}
