//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - Route handlers for displaying the dashboard and dismissing insights
//! - HTML view functions for rendering the dashboard UI
//! - State and form types used by the handlers

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    Form, PrivateCookieJar,
    cookie::{Cookie, Key},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Month;

use crate::{
    AppState, Error,
    dashboard::{
        cards::{insights_panel, stat_cards_view},
        categories::{CategoryBucket, category_buckets},
        charts::{
            DashboardChart, balance_chart, cash_flow_chart, charts_script, charts_view,
            expense_pie_chart,
        },
        filter::PeriodFilter,
        insights::{Insight, generate_insights},
        series::{TimeSeriesPoint, daily_series, monthly_series},
        stats::{PeriodStats, period_stats},
    },
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    timezone::local_date_today,
    transaction::{Transaction, TransactionKind, get_transactions_for_user},
    user::UserID,
};

/// The cookie that stores the keys of insights the user has dismissed.
const DISMISSED_INSIGHTS_COOKIE: &str = "dismissed_insights";

/// The state needed for displaying the dashboard page.
#[derive(Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The key for decrypting the dismissed-insights cookie.
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<DashboardState> for Key {
    fn from_ref(state: &DashboardState) -> Self {
        state.cookie_key.clone()
    }
}

/// The period filter query parameters shared by the dashboard and report pages.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// Calendar month number (1-12), or absent for all months.
    pub month: Option<u8>,
    /// Calendar year, or absent for all years.
    pub year: Option<i32>,
    /// Free-text search over description, category, and amount.
    pub search: Option<String>,
}

impl PeriodQuery {
    /// The filter the query describes. Out-of-range month numbers are treated
    /// as "all months" rather than rejected.
    pub(crate) fn filter(&self) -> PeriodFilter {
        PeriodFilter {
            month: self.month.and_then(|month| Month::try_from(month).ok()),
            year: self.year,
            search: self.search.clone(),
        }
    }
}

/// Form data for dismissing an insight.
///
/// Carries the active period filter alongside the key so the refreshed panel
/// is computed over the same transactions the user was looking at.
#[derive(Deserialize)]
pub struct DismissInsightForm {
    /// The stable key of the insight to dismiss.
    pub key: String,
    /// Calendar month number (1-12) of the active filter.
    pub month: Option<u8>,
    /// Calendar year of the active filter.
    pub year: Option<i32>,
    /// Search text of the active filter.
    pub search: Option<String>,
}

/// A human readable label for the selected period, used in chart subtitles.
pub(crate) fn period_label(filter: &PeriodFilter) -> String {
    match (filter.month, filter.year) {
        (Some(month), Some(year)) => format!("{month} {year}"),
        (Some(month), None) => month.to_string(),
        (None, Some(year)) => year.to_string(),
        (None, None) => "All time".to_string(),
    }
}

/// The insight keys stored in the dismissed-insights cookie.
fn dismissed_insights(jar: &PrivateCookieJar) -> HashSet<String> {
    jar.get(DISMISSED_INSIGHTS_COOKIE)
        .map(|cookie| {
            cookie
                .value()
                .split(',')
                .filter(|key| !key.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// The new cookie value after dismissing `key`, or `None` when the key is
/// already dismissed and the cookie should be left alone.
fn updated_dismissals(dismissed: &HashSet<String>, key: &str) -> Option<String> {
    if dismissed.contains(key) {
        return None;
    }

    let mut keys: Vec<&str> = dismissed.iter().map(String::as_str).collect();
    keys.sort_unstable();
    keys.push(key);

    Some(keys.join(","))
}

/// Display a page with an overview of the user's transactions for a period.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PeriodQuery>,
    jar: PrivateCookieJar,
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
    let stats = period_stats(&filtered);
    let expense_buckets = category_buckets(TransactionKind::Expense, &filtered);
    let insights = generate_insights(
        transactions.len(),
        &stats,
        &expense_buckets,
        &dismissed_insights(&jar),
    );

    let this_year = local_date_today(&state.local_timezone)?.year();

    let label = period_label(&filter);
    let points = match filter.month {
        Some(month) => daily_series(filter.year.unwrap_or(this_year), month, &filtered),
        None => monthly_series(&filtered),
    };
    let charts = build_dashboard_charts(&label, &expense_buckets, &points);

    let years = selectable_years(this_year, &transactions);

    Ok(dashboard_view(&filter, &years, &stats, &insights, &charts).into_response())
}

/// API endpoint that records a dismissed insight and returns the refreshed
/// insights panel.
pub async fn dismiss_insight(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<DismissInsightForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let transactions = match get_transactions_for_user(user_id, &connection) {
        Ok(transactions) => transactions,
        Err(error) => {
            tracing::error!("could not get transactions: {error}");
            return error.into_alert_response();
        }
    };
    drop(connection);

    let mut dismissed = dismissed_insights(&jar);
    // Dismissing an already dismissed insight must not grow the cookie.
    let jar = match updated_dismissals(&dismissed, &form.key) {
        Some(value) => {
            dismissed.insert(form.key.clone());
            jar.add(
                Cookie::build((DISMISSED_INSIGHTS_COOKIE, value))
                    .path("/")
                    .http_only(true)
                    .build(),
            )
        }
        None => jar,
    };

    let filter = PeriodQuery {
        month: form.month,
        year: form.year,
        search: form.search,
    }
    .filter();
    let filtered = filter.apply(&transactions);
    let stats = period_stats(&filtered);
    let expense_buckets = category_buckets(TransactionKind::Expense, &filtered);
    let insights = generate_insights(transactions.len(), &stats, &expense_buckets, &dismissed);

    (jar, insights_panel(&insights, &filter)).into_response()
}

/// Creates the array of dashboard charts for the selected period.
fn build_dashboard_charts(
    label: &str,
    expense_buckets: &[CategoryBucket],
    points: &[TimeSeriesPoint],
) -> [DashboardChart; 3] {
    [
        DashboardChart {
            id: "expense-pie-chart",
            options: expense_pie_chart(label, expense_buckets).to_string(),
        },
        DashboardChart {
            id: "cash-flow-chart",
            options: cash_flow_chart(label, points).to_string(),
        },
        DashboardChart {
            id: "balance-chart",
            options: balance_chart(label, points).to_string(),
        },
    ]
}

/// The years offered in the filter bar's year drop-down.
///
/// Every year with at least one transaction, plus the current year, in
/// ascending order.
fn selectable_years(this_year: i32, transactions: &[Transaction]) -> Vec<i32> {
    let mut years: Vec<i32> = transactions
        .iter()
        .map(|transaction| transaction.date.year())
        .chain(std::iter::once(this_year))
        .collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Renders the filter bar with month/year drop-downs and a search box.
///
/// The selects resubmit the form on change; the form is a plain GET so the
/// selected period lands in the URL and survives reloads and sharing.
pub(crate) fn filter_bar(action: &'static str, filter: &PeriodFilter, years: &[i32]) -> Markup {
    let selected_month = filter.month.map(|month| month as u8);

    html!(
        form
            method="get"
            action=(action)
            class="w-full flex flex-wrap items-end gap-3 mb-4 bg-gray-50
                dark:bg-gray-800 p-4 rounded-lg"
        {
            label class="flex flex-col text-sm font-medium text-gray-900 dark:text-white" {
                "Month"
                select
                    name="month"
                    onchange="this.form.submit()"
                    class="mt-1 p-2.5 rounded text-sm bg-gray-50 border border-gray-300
                        dark:bg-gray-700 dark:border-gray-600 dark:text-white"
                {
                    option value="" { "All" }
                    @for month in 1..=12u8 {
                        @let name = Month::try_from(month).map(|m| m.to_string()).unwrap_or_default();
                        option value=(month) selected[selected_month == Some(month)] { (name) }
                    }
                }
            }

            label class="flex flex-col text-sm font-medium text-gray-900 dark:text-white" {
                "Year"
                select
                    name="year"
                    onchange="this.form.submit()"
                    class="mt-1 p-2.5 rounded text-sm bg-gray-50 border border-gray-300
                        dark:bg-gray-700 dark:border-gray-600 dark:text-white"
                {
                    option value="" { "All" }
                    @for year in years {
                        option value=(year) selected[filter.year == Some(*year)] { (year) }
                    }
                }
            }

            label class="flex flex-col grow text-sm font-medium text-gray-900 dark:text-white" {
                "Search"
                input
                    type="search"
                    name="search"
                    value=[filter.search.as_deref()]
                    placeholder="Description, category, or amount"
                    class="mt-1 p-2.5 rounded text-sm bg-gray-50 border border-gray-300
                        dark:bg-gray-700 dark:border-gray-600 dark:text-white"
                ;
            }

            button
                type="submit"
                class="px-4 py-2.5 bg-blue-500 hover:bg-blue-600 text-white text-sm
                    font-medium rounded"
            {
                "Apply"
            }
        }
    )
}

/// Renders the main dashboard page with stat cards, insights, and charts.
fn dashboard_view(
    filter: &PeriodFilter,
    years: &[i32],
    stats: &PeriodStats,
    insights: &[Insight],
    charts: &[DashboardChart],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "add a transaction");

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (filter_bar(endpoints::DASHBOARD_VIEW, filter, years))

            (stat_cards_view(stats))

            (insights_panel(insights, filter))

            (charts_view(charts))

            p class="text-sm text-gray-600 dark:text-gray-400" {
                "Not seeing what you expect? Adjust the filter above or "
                (new_transaction_link) "."
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Dashboard", &scripts, &content)
}

#[cfg(test)]
mod dashboard_route_tests {
    use std::{
        collections::HashSet,
        sync::{Arc, Mutex},
    };

    use axum::{
        Extension,
        body::Body,
        extract::{Query, State},
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use sha2::{Digest, Sha512};
    use time::macros::date;

    use crate::{
        db::initialize,
        transaction::{TransactionDraft, TransactionKind, create_transaction},
        user::{UserID, create_user},
    };

    use super::{
        DashboardState, DismissInsightForm, PeriodQuery, dismiss_insight, get_dashboard_page,
        updated_dismissals,
    };

    fn get_test_state() -> (DashboardState, UserID) {
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
        let user_id = user.id;

        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            cookie_key: Key::from(&Sha512::digest("nafstenoas")),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (state, user_id)
    }

    fn get_test_jar(state: &DashboardState) -> PrivateCookieJar {
        PrivateCookieJar::new(state.cookie_key.clone())
    }

    fn draft(
        kind: TransactionKind,
        amount: f64,
        category: &str,
        date: time::Date,
    ) -> TransactionDraft {
        TransactionDraft {
            kind,
            amount,
            category: category.to_owned(),
            date,
            description: String::new(),
        }
    }

    async fn parse_html(response: Response<Body>) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{}", chart_id)).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Chart with id '{}' not found",
            chart_id
        );
    }

    #[tokio::test]
    async fn dashboard_page_loads_successfully() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                draft(TransactionKind::Income, 100.0, "Salary", date!(2024 - 03 - 01)),
                user_id,
                &connection,
            )
            .unwrap();
        }
        let jar = get_test_jar(&state);

        let response = get_dashboard_page(
            State(state),
            Extension(user_id),
            Query(PeriodQuery::default()),
            jar,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html(response).await;
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
        assert_chart_exists(&html, "expense-pie-chart");
        assert_chart_exists(&html, "cash-flow-chart");
        assert_chart_exists(&html, "balance-chart");
    }

    #[tokio::test]
    async fn new_user_sees_the_welcome_insight() {
        let (state, user_id) = get_test_state();
        let jar = get_test_jar(&state);

        let response = get_dashboard_page(
            State(state),
            Extension(user_id),
            Query(PeriodQuery::default()),
            jar,
        )
        .await
        .unwrap();

        let html = parse_html(response).await;
        assert!(html.html().contains("Welcome!"));
    }

    #[tokio::test]
    async fn month_filter_drives_every_aggregate_on_the_page() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                draft(TransactionKind::Income, 500.0, "Salary", date!(2024 - 03 - 10)),
                user_id,
                &connection,
            )
            .unwrap();
            create_transaction(
                draft(TransactionKind::Expense, 100.0, "Food", date!(2024 - 03 - 15)),
                user_id,
                &connection,
            )
            .unwrap();
            // Outside the selected month, must not leak into the page.
            create_transaction(
                draft(TransactionKind::Expense, 999.0, "Housing", date!(2024 - 04 - 01)),
                user_id,
                &connection,
            )
            .unwrap();
        }
        let jar = get_test_jar(&state);

        let response = get_dashboard_page(
            State(state),
            Extension(user_id),
            Query(PeriodQuery {
                month: Some(3),
                year: Some(2024),
                search: None,
            }),
            jar,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        let text = html.html();

        assert!(text.contains("$500.00"), "income card missing");
        assert!(text.contains("$100.00"), "expense card missing");
        assert!(text.contains("$400.00"), "balance card missing");
        assert!(text.contains("20%"), "percent spent missing");
        assert!(text.contains("March 2024"), "period label missing");
        assert!(!text.contains("$999.00"), "April expense leaked into March");
    }

    #[tokio::test]
    async fn dismissing_an_insight_sets_the_cookie_and_hides_it() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                draft(TransactionKind::Income, 500.0, "Salary", date!(2024 - 03 - 10)),
                user_id,
                &connection,
            )
            .unwrap();
        }
        let jar = get_test_jar(&state);

        let response = dismiss_insight(
            State(state),
            Extension(user_id),
            jar,
            axum_extra::extract::Form(DismissInsightForm {
                key: "positive-balance".to_string(),
                month: None,
                year: None,
                search: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .expect("expected a set-cookie header")
            .to_str()
            .unwrap();
        assert!(cookie.contains("dismissed_insights"));

        let html = parse_html(response).await;
        assert!(!html.html().contains("You're in the green"));
    }

    #[test]
    fn updated_dismissals_appends_new_keys() {
        let dismissed = HashSet::from(["positive-balance".to_string()]);

        let value = updated_dismissals(&dismissed, "spending-limit");

        assert_eq!(value, Some("positive-balance,spending-limit".to_string()));
    }

    #[test]
    fn updated_dismissals_is_a_no_op_for_known_keys() {
        let dismissed = HashSet::from(["positive-balance".to_string()]);

        assert_eq!(updated_dismissals(&dismissed, "positive-balance"), None);
    }
}
