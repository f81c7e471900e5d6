//! Transaction management for the application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionDraft` for creating transactions
//! - The installment expander that turns one draft into a monthly series
//! - Database functions for storing, querying, and deleting transactions
//! - View handlers for transaction-related web pages

mod categories;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod installments;
mod new_transaction_page;
mod transactions_page;

pub use categories::{EXPENSE_CATEGORIES, INCOME_CATEGORIES, categories_for};
pub use core::{
    Transaction, TransactionDraft, TransactionKind, create_transaction_batch,
    create_transaction_table, get_transactions_for_user,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use installments::{InstallmentPolicy, expand_installments};
pub use new_transaction_page::get_new_transaction_page;
pub use transactions_page::get_transactions_page;

#[cfg(test)]
pub use core::{count_transactions, create_transaction};
