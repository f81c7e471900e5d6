//! The savings goal page.
//!
//! Tracks progress toward a monthly savings target and projects savings
//! growth forward a year. Progress is measured per calendar month across the
//! selected year: a month contributes its balance clamped between zero and
//! the target, so one windfall month cannot paper over months of
//! overspending, and a bad month never subtracts from progress already made.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    dashboard::charts::{DashboardChart, charts_script, charts_view, projection_chart},
    endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, base, format_currency},
    navigation::NavBar,
    timezone::local_date_today,
    transaction::{Transaction, get_transactions_for_user},
    user::UserID,
};

const DEFAULT_MONTHLY_TARGET: f64 = 500.0;
const DEFAULT_MONTHLY_SAVINGS: f64 = 250.0;
const DEFAULT_GROWTH_RATE: f64 = 8.0;

/// How many months the savings projection looks ahead.
const PROJECTION_MONTHS: u32 = 12;

/// Progress toward a monthly savings target over one calendar year.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    /// The savings target per month.
    pub monthly_target: f64,
    /// The annual target, twelve times the monthly target.
    pub target: f64,
    /// The amount actually saved, counting each month's balance clamped
    /// between zero and the monthly target.
    pub realized: f64,
    /// `realized` over `target` as a whole percentage, capped at 100.
    pub percent: u8,
}

/// Measure progress toward saving `monthly_target` every month of `year`.
///
/// Each of the year's twelve months contributes `clamp(balance, 0,
/// monthly_target)` to the realized total. A month that saved more than the
/// target only counts the target, and a month in the red counts zero.
/// Transactions dated outside `year` are ignored.
pub fn goal_progress(monthly_target: f64, year: i32, transactions: &[Transaction]) -> GoalProgress {
    let mut monthly_balances = [0.0f64; 12];

    for transaction in transactions {
        if transaction.date.year() == year {
            monthly_balances[transaction.date.month() as usize - 1] +=
                transaction.signed_amount();
        }
    }

    let target = monthly_target * 12.0;
    let realized: f64 = monthly_balances
        .iter()
        .map(|balance| balance.clamp(0.0, monthly_target.max(0.0)))
        .sum();

    let percent = if target > 0.0 {
        (realized / target * 100.0).round().clamp(0.0, 100.0) as u8
    } else {
        0
    };

    GoalProgress {
        monthly_target,
        target,
        realized,
        percent,
    }
}

/// One point on the savings projection curve.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionPoint {
    /// "Now" or "+N mo".
    pub label: String,
    /// The projected total at that point.
    pub total: f64,
}

/// Project savings forward a year with monthly compounding.
///
/// Each month the contribution is added and the whole pot grows by one
/// twelfth of the annual rate. Returns thirteen points: the starting total
/// and one per projected month.
pub fn project_savings(
    starting_total: f64,
    monthly_contribution: f64,
    annual_rate_percent: f64,
) -> Vec<ProjectionPoint> {
    let monthly_growth = 1.0 + annual_rate_percent / 100.0 / 12.0;
    let mut points = Vec::with_capacity(PROJECTION_MONTHS as usize + 1);
    let mut total = starting_total;

    points.push(ProjectionPoint {
        label: "Now".to_string(),
        total,
    });

    for month in 1..=PROJECTION_MONTHS {
        total = (total + monthly_contribution) * monthly_growth;
        points.push(ProjectionPoint {
            label: format!("+{month} mo"),
            total,
        });
    }

    points
}

/// The state needed for the goals page.
#[derive(Debug, Clone)]
pub struct GoalState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The goal settings, carried in the URL so adjusting them is shareable and
/// survives a reload without any server-side storage.
#[derive(Debug, Default, Deserialize)]
pub struct GoalQuery {
    /// The savings target per month.
    pub monthly_target: Option<f64>,
    /// The calendar year to measure progress over. Defaults to the current
    /// year.
    pub year: Option<i32>,
    /// The monthly contribution for the projection.
    pub monthly_savings: Option<f64>,
    /// The assumed annual growth rate, in percent.
    pub growth_rate: Option<f64>,
}

/// Display the savings goal page.
pub async fn get_goals_page(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<GoalQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_for_user(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
    drop(connection);

    let monthly_target = query.monthly_target.unwrap_or(DEFAULT_MONTHLY_TARGET);
    let monthly_savings = query.monthly_savings.unwrap_or(DEFAULT_MONTHLY_SAVINGS);
    let growth_rate = query.growth_rate.unwrap_or(DEFAULT_GROWTH_RATE);
    let year = match query.year {
        Some(year) => year,
        None => local_date_today(&state.local_timezone)?.year(),
    };

    let progress = goal_progress(monthly_target, year, &transactions);
    let current_total: f64 = transactions
        .iter()
        .map(Transaction::signed_amount)
        .sum();
    let projection = project_savings(current_total, monthly_savings, growth_rate);

    Ok(goals_view(&progress, year, monthly_savings, growth_rate, &projection).into_response())
}

fn goals_view(
    progress: &GoalProgress,
    year: i32,
    monthly_savings: f64,
    growth_rate: f64,
    projection: &[ProjectionPoint],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();

    let labels = projection.iter().map(|point| point.label.clone()).collect();
    let totals = projection.iter().map(|point| point.total).collect();
    let charts = [DashboardChart {
        id: "projection-chart",
        options: projection_chart(labels, totals).to_string(),
    }];

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
            max-w-screen-xl text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold mb-4" { "Savings goal" }

            form
                method="get"
                action=(endpoints::GOALS_VIEW)
                class="w-full flex flex-wrap items-end gap-3 mb-4 bg-gray-50
                    dark:bg-gray-800 p-4 rounded-lg"
            {
                label class=(FORM_LABEL_STYLE) {
                    "Monthly target ($)"
                    input
                        type="number"
                        name="monthly_target"
                        value=(progress.monthly_target)
                        min="0"
                        step="any"
                        class=(FORM_TEXT_INPUT_STYLE)
                    ;
                }

                label class=(FORM_LABEL_STYLE) {
                    "Year"
                    input
                        type="number"
                        name="year"
                        value=(year)
                        class=(FORM_TEXT_INPUT_STYLE)
                    ;
                }

                label class=(FORM_LABEL_STYLE) {
                    "Monthly savings ($)"
                    input
                        type="number"
                        name="monthly_savings"
                        value=(monthly_savings)
                        min="0"
                        step="any"
                        class=(FORM_TEXT_INPUT_STYLE)
                    ;
                }

                label class=(FORM_LABEL_STYLE) {
                    "Annual growth rate (%)"
                    input
                        type="number"
                        name="growth_rate"
                        value=(growth_rate)
                        min="0"
                        step="any"
                        class=(FORM_TEXT_INPUT_STYLE)
                    ;
                }

                button
                    type="submit"
                    class="px-4 py-2.5 bg-blue-500 hover:bg-blue-600 text-white text-sm
                        font-medium rounded"
                {
                    "Update"
                }
            }

            section class="w-full mx-auto mb-4 bg-white dark:bg-gray-800 border
                border-gray-200 dark:border-gray-700 rounded-lg p-4 shadow-md"
            {
                div class="flex justify-between items-baseline mb-2" {
                    h3 class="font-semibold" { "Progress in " (year) }
                    span class="text-sm text-gray-600 dark:text-gray-400" {
                        (format_currency(progress.realized))
                        " of "
                        (format_currency(progress.target))
                        " saved"
                    }
                }

                div
                    class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5"
                    role="progressbar"
                    aria-valuenow=(progress.percent)
                    aria-valuemin="0"
                    aria-valuemax="100"
                {
                    @if progress.percent > 0 {
                        div
                            class="bg-green-600 dark:bg-green-500 h-2.5 rounded-full transition-all"
                            style=(format!("width: {}%", progress.percent))
                        {}
                    }
                }

                p class="text-sm text-gray-600 dark:text-gray-400 mt-2" {
                    (progress.percent) "% of the way there"
                }
            }

            (charts_view(&charts))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&charts),
    ];

    base("Goals", &scripts, &content)
}

#[cfg(test)]
mod goal_progress_tests {
    use time::macros::date;

    use crate::{
        goal::goal_progress,
        transaction::{Transaction, TransactionKind},
        user::UserID,
    };

    fn transaction(kind: TransactionKind, amount: f64, date: time::Date) -> Transaction {
        Transaction {
            id: 0,
            user_id: UserID::new(1),
            kind,
            amount,
            category: "Other".to_owned(),
            date,
            description: String::new(),
        }
    }

    #[test]
    fn monthly_balances_are_clamped_to_the_target() {
        // Three months: saved 1000, lost 200, saved 300 against a 400 target.
        let transactions = vec![
            transaction(TransactionKind::Income, 1000.0, date!(2024 - 01 - 10)),
            transaction(TransactionKind::Expense, 200.0, date!(2024 - 02 - 10)),
            transaction(TransactionKind::Income, 300.0, date!(2024 - 03 - 10)),
        ];

        let progress = goal_progress(400.0, 2024, &transactions);

        assert_eq!(progress.realized, 700.0);
        assert_eq!(progress.target, 4800.0);
        assert_eq!(progress.percent, 15);
    }

    #[test]
    fn no_transactions_means_zero_progress() {
        let progress = goal_progress(400.0, 2024, &[]);

        assert_eq!(progress.realized, 0.0);
        assert_eq!(progress.target, 4800.0);
        assert_eq!(progress.percent, 0);
    }

    #[test]
    fn a_full_year_on_target_is_one_hundred_percent() {
        let transactions: Vec<_> = (1..=12u8)
            .map(|month| {
                transaction(
                    TransactionKind::Income,
                    400.0,
                    time::Date::from_calendar_date(2024, time::Month::try_from(month).unwrap(), 1)
                        .unwrap(),
                )
            })
            .collect();

        let progress = goal_progress(400.0, 2024, &transactions);

        assert_eq!(progress.realized, 4800.0);
        assert_eq!(progress.percent, 100);
    }

    #[test]
    fn other_years_do_not_count() {
        let transactions = vec![
            transaction(TransactionKind::Income, 400.0, date!(2023 - 05 - 01)),
            transaction(TransactionKind::Income, 400.0, date!(2024 - 05 - 01)),
        ];

        let progress = goal_progress(400.0, 2024, &transactions);

        assert_eq!(progress.realized, 400.0);
    }
}

#[cfg(test)]
mod projection_tests {
    use crate::goal::project_savings;

    #[test]
    fn projection_has_thirteen_points() {
        let points = project_savings(1000.0, 250.0, 8.0);

        assert_eq!(points.len(), 13);
        assert_eq!(points[0].label, "Now");
        assert_eq!(points[0].total, 1000.0);
        assert_eq!(points[12].label, "+12 mo");
    }

    #[test]
    fn zero_growth_rate_is_linear() {
        let points = project_savings(100.0, 50.0, 0.0);

        assert!((points[12].total - 700.0).abs() < 1e-9);
    }

    #[test]
    fn growth_compounds_monthly() {
        let points = project_savings(1000.0, 0.0, 12.0);

        // 1% per month for a year.
        let expected = 1000.0 * 1.01f64.powi(12);
        assert!((points[12].total - expected).abs() < 1e-6);
    }
}
