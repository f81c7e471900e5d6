//! Narrows a list of transactions down to a reporting period and search term.

use time::Month;

use crate::transaction::Transaction;

/// The period and search term the user has selected on the dashboard.
///
/// `None` for the month or year means "all". The criteria are AND-combined:
/// a transaction must match every one that is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodFilter {
    /// Keep only transactions in this calendar month.
    pub month: Option<Month>,
    /// Keep only transactions in this year.
    pub year: Option<i32>,
    /// Keep only transactions whose description, category, or amount contains
    /// this text, case-insensitively.
    pub search: Option<String>,
}

impl PeriodFilter {
    /// The transactions from `transactions` that match every criterion.
    ///
    /// Filtering never reorders: the output keeps the input's relative order.
    /// Applying the same filter to its own output returns it unchanged.
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);

        transactions
            .iter()
            .filter(|transaction| {
                self.month
                    .is_none_or(|month| transaction.date.month() == month)
            })
            .filter(|transaction| self.year.is_none_or(|year| transaction.date.year() == year))
            .filter(|transaction| {
                search
                    .as_deref()
                    .is_none_or(|term| matches_search(transaction, term))
            })
            .cloned()
            .collect()
    }
}

/// Whether the lowercased `term` appears in the transaction's description,
/// category, or the literal text of its amount.
fn matches_search(transaction: &Transaction, term: &str) -> bool {
    transaction.description.to_lowercase().contains(term)
        || transaction.category.to_lowercase().contains(term)
        || transaction.amount.to_string().contains(term)
}
