//! The fixed category vocabularies for income and expense transactions.
//!
//! Categories are a UI convenience: the select boxes on the new transaction
//! form offer these options, but the database stores whatever string it is
//! given so old records survive vocabulary changes.

use crate::transaction::TransactionKind;

/// The categories offered for income transactions.
pub const INCOME_CATEGORIES: [&str; 5] = ["Salary", "Investments", "Freelance", "Gift", "Other"];

/// The categories offered for expense transactions.
pub const EXPENSE_CATEGORIES: [&str; 7] = [
    "Food",
    "Housing",
    "Transport",
    "Leisure",
    "Health",
    "Education",
    "Other",
];

/// The category options for transactions of `kind`.
pub fn categories_for(kind: TransactionKind) -> &'static [&'static str] {
    match kind {
        TransactionKind::Income => &INCOME_CATEGORIES,
        TransactionKind::Expense => &EXPENSE_CATEGORIES,
    }
}

#[cfg(test)]
mod categories_tests {
    use crate::transaction::TransactionKind;

    use super::{EXPENSE_CATEGORIES, INCOME_CATEGORIES, categories_for};

    #[test]
    fn each_kind_gets_its_own_vocabulary() {
        assert_eq!(categories_for(TransactionKind::Income), INCOME_CATEGORIES);
        assert_eq!(categories_for(TransactionKind::Expense), EXPENSE_CATEGORIES);
    }
}
