//! Summary statistics for a set of transactions.

use crate::transaction::{Transaction, TransactionKind};

/// The headline numbers shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PeriodStats {
    /// The sum of income amounts.
    pub income: f64,
    /// The sum of expense amounts (as a positive number).
    pub expense: f64,
    /// Income minus expenses.
    pub balance: f64,
    /// What share of income was spent, as a rounded whole percentage.
    ///
    /// Zero when there is no income, so a period of pure spending does not
    /// divide by zero or show a nonsense percentage.
    pub percent_spent: i64,
}

/// Compute the summary statistics for `transactions`.
pub fn period_stats(transactions: &[Transaction]) -> PeriodStats {
    let income: f64 = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Income)
        .map(|transaction| transaction.amount)
        .sum();
    let expense: f64 = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
        .map(|transaction| transaction.amount)
        .sum();

    let percent_spent = if income > 0.0 {
        (expense / income * 100.0).round() as i64
    } else {
        0
    };

    PeriodStats {
        income,
        expense,
        balance: income - expense,
        percent_spent,
    }
}

#[cfg(test)]
mod period_stats_tests {
    use time::macros::date;

    use crate::transaction::{Transaction, TransactionKind};
    use crate::user::UserID;

    use super::period_stats;

    fn transaction(kind: TransactionKind, amount: f64) -> Transaction {
        Transaction {
            id: 0,
            user_id: UserID::new(1),
            kind,
            amount,
            category: "Other".to_string(),
            date: date!(2024 - 03 - 05),
            description: String::new(),
        }
    }

    #[test]
    fn balance_is_income_minus_expenses() {
        let transactions = vec![
            transaction(TransactionKind::Income, 1200.0),
            transaction(TransactionKind::Expense, 300.0),
            transaction(TransactionKind::Expense, 150.0),
            transaction(TransactionKind::Income, 50.0),
        ];

        let stats = period_stats(&transactions);

        assert_eq!(stats.income, 1250.0);
        assert_eq!(stats.expense, 450.0);
        assert_eq!(stats.balance, stats.income - stats.expense);
    }

    #[test]
    fn percent_spent_is_zero_when_there_is_no_income() {
        let transactions = vec![
            transaction(TransactionKind::Expense, 300.0),
            transaction(TransactionKind::Expense, 150.0),
        ];

        let stats = period_stats(&transactions);

        assert_eq!(stats.percent_spent, 0);
        assert_eq!(stats.balance, -450.0);
    }

    #[test]
    fn percent_spent_is_rounded_to_a_whole_number() {
        let transactions = vec![
            transaction(TransactionKind::Income, 300.0),
            transaction(TransactionKind::Expense, 100.0),
        ];

        let stats = period_stats(&transactions);

        // 100 / 300 = 33.33...%
        assert_eq!(stats.percent_spent, 33);
    }

    #[test]
    fn no_transactions_gives_zeroed_stats() {
        let stats = period_stats(&[]);

        assert_eq!(stats, super::PeriodStats::default());
    }
}
