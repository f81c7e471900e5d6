//! Income/expense time series for the dashboard charts.

use time::Month;
use time::util::days_in_year_month;

use crate::transaction::{Transaction, TransactionKind};

/// One bucket of the cash-flow chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    /// The axis label, a day number or a month abbreviation.
    pub label: String,
    /// Income in this bucket.
    pub income: f64,
    /// Expenses in this bucket.
    pub expense: f64,
    /// The running balance up to and including this bucket.
    ///
    /// Buckets with no transactions still carry the balance forward, so the
    /// balance line never drops to zero just because a day was quiet.
    pub balance: f64,
}

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One point per day of `month` in `year`.
///
/// Only transactions dated in that month and year are counted.
pub fn daily_series(year: i32, month: Month, transactions: &[Transaction]) -> Vec<TimeSeriesPoint> {
    let days = days_in_year_month(year, month);
    let mut points: Vec<TimeSeriesPoint> = (1..=days)
        .map(|day| TimeSeriesPoint {
            label: day.to_string(),
            income: 0.0,
            expense: 0.0,
            balance: 0.0,
        })
        .collect();

    for transaction in transactions {
        if transaction.date.year() == year && transaction.date.month() == month {
            add_to_bucket(&mut points[transaction.date.day() as usize - 1], transaction);
        }
    }

    accumulate_balance(&mut points);
    points
}

/// One point per calendar month, January through December.
///
/// The caller is expected to have already narrowed `transactions` to a single
/// year; transactions from different years that share a month land in the
/// same bucket.
pub fn monthly_series(transactions: &[Transaction]) -> Vec<TimeSeriesPoint> {
    let mut points: Vec<TimeSeriesPoint> = MONTH_LABELS
        .iter()
        .map(|label| TimeSeriesPoint {
            label: label.to_string(),
            income: 0.0,
            expense: 0.0,
            balance: 0.0,
        })
        .collect();

    for transaction in transactions {
        add_to_bucket(
            &mut points[transaction.date.month() as usize - 1],
            transaction,
        );
    }

    accumulate_balance(&mut points);
    points
}

fn add_to_bucket(point: &mut TimeSeriesPoint, transaction: &Transaction) {
    match transaction.kind {
        TransactionKind::Income => point.income += transaction.amount,
        TransactionKind::Expense => point.expense += transaction.amount,
    }
}

fn accumulate_balance(points: &mut [TimeSeriesPoint]) {
    let mut balance = 0.0;
    for point in points {
        balance += point.income - point.expense;
        point.balance = balance;
    }
}

#[cfg(test)]
mod series_tests {
    use time::{Date, Month, macros::date};

    use crate::transaction::{Transaction, TransactionKind};
    use crate::user::UserID;

    use super::{daily_series, monthly_series};

    fn transaction(date: Date, kind: TransactionKind, amount: f64) -> Transaction {
        Transaction {
            id: 0,
            user_id: UserID::new(1),
            kind,
            amount,
            category: "Other".to_string(),
            date,
            description: String::new(),
        }
    }

    #[test]
    fn daily_series_has_one_point_per_day_of_the_month() {
        let points = daily_series(2024, Month::February, &[]);

        assert_eq!(points.len(), 29);
        assert_eq!(points[0].label, "1");
        assert_eq!(points[28].label, "29");
    }

    #[test]
    fn cumulative_balance_runs_across_buckets() {
        let transactions = vec![
            transaction(date!(2024 - 03 - 01), TransactionKind::Income, 100.0),
            transaction(date!(2024 - 03 - 02), TransactionKind::Expense, 50.0),
            transaction(date!(2024 - 03 - 03), TransactionKind::Income, 30.0),
        ];

        let points = daily_series(2024, Month::March, &transactions);

        assert_eq!(points[0].balance, 100.0);
        assert_eq!(points[1].balance, 50.0);
        assert_eq!(points[2].balance, 80.0);
    }

    #[test]
    fn empty_buckets_carry_the_balance_forward() {
        let transactions = vec![transaction(
            date!(2024 - 03 - 01),
            TransactionKind::Income,
            100.0,
        )];

        let points = daily_series(2024, Month::March, &transactions);

        assert_eq!(points[15].income, 0.0);
        assert_eq!(points[15].expense, 0.0);
        assert_eq!(points[15].balance, 100.0);
        assert_eq!(points[30].balance, 100.0);
    }

    #[test]
    fn daily_series_ignores_transactions_outside_the_month() {
        let transactions = vec![
            transaction(date!(2024 - 03 - 01), TransactionKind::Income, 100.0),
            transaction(date!(2024 - 04 - 01), TransactionKind::Income, 999.0),
            transaction(date!(2023 - 03 - 01), TransactionKind::Income, 999.0),
        ];

        let points = daily_series(2024, Month::March, &transactions);

        assert_eq!(points[0].income, 100.0);
        assert_eq!(points.last().map(|point| point.balance), Some(100.0));
    }

    #[test]
    fn monthly_series_buckets_by_calendar_month() {
        let transactions = vec![
            transaction(date!(2024 - 01 - 10), TransactionKind::Income, 500.0),
            transaction(date!(2024 - 01 - 20), TransactionKind::Expense, 200.0),
            transaction(date!(2024 - 06 - 05), TransactionKind::Expense, 100.0),
        ];

        let points = monthly_series(&transactions);

        assert_eq!(points.len(), 12);
        assert_eq!(points[0].label, "Jan");
        assert_eq!(points[0].income, 500.0);
        assert_eq!(points[0].expense, 200.0);
        assert_eq!(points[0].balance, 300.0);
        assert_eq!(points[5].balance, 200.0);
        assert_eq!(points[11].balance, 200.0);
    }
}
