//! Per-category totals for the dashboard pie chart and the detail views.

use crate::transaction::{Transaction, TransactionKind};

/// The colors cycled through for category chart slices, in assignment order.
pub const CATEGORY_PALETTE: [&str; 7] = [
    "#10b981", "#3b82f6", "#f59e0b", "#6366f1", "#f43f5e", "#8b5cf6", "#ec4899",
];

/// The total spent or earned in one category, with its chart color.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBucket {
    /// The category name.
    pub category: String,
    /// The sum of amounts filed under the category.
    pub total: f64,
    /// The palette color assigned to the category.
    pub color: &'static str,
}

/// Total `kind` transactions per category, in first-seen order.
///
/// Colors come from [CATEGORY_PALETTE] in the same order the categories first
/// appear, wrapping around when there are more categories than colors. The
/// dashboard pie chart relies on this order staying stable across a filter
/// change that keeps the same records.
pub fn category_buckets(kind: TransactionKind, transactions: &[Transaction]) -> Vec<CategoryBucket> {
    let mut buckets: Vec<CategoryBucket> = Vec::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.kind == kind)
    {
        match buckets
            .iter_mut()
            .find(|bucket| bucket.category == transaction.category)
        {
            Some(bucket) => bucket.total += transaction.amount,
            None => buckets.push(CategoryBucket {
                category: transaction.category.clone(),
                total: transaction.amount,
                color: CATEGORY_PALETTE[buckets.len() % CATEGORY_PALETTE.len()],
            }),
        }
    }

    buckets
}

/// Total `kind` transactions per category, largest first.
///
/// The income and expense detail pages list categories by how much money went
/// through them. Ties keep their first-seen order, and colors are the same
/// ones [category_buckets] assigns.
pub fn ranked_category_buckets(
    kind: TransactionKind,
    transactions: &[Transaction],
) -> Vec<CategoryBucket> {
    let mut buckets = category_buckets(kind, transactions);
    buckets.sort_by(|a, b| b.total.total_cmp(&a.total));
    buckets
}

#[cfg(test)]
mod category_bucket_tests {
    use time::macros::date;

    use crate::transaction::{Transaction, TransactionKind};
    use crate::user::UserID;

    use super::{CATEGORY_PALETTE, category_buckets, ranked_category_buckets};

    fn expense(category: &str, amount: f64) -> Transaction {
        Transaction {
            id: 0,
            user_id: UserID::new(1),
            kind: TransactionKind::Expense,
            amount,
            category: category.to_string(),
            date: date!(2024 - 03 - 05),
            description: String::new(),
        }
    }

    #[test]
    fn buckets_keep_first_seen_order_and_sum_amounts() {
        let transactions = vec![
            expense("Food", 20.0),
            expense("Transport", 15.0),
            expense("Food", 30.0),
            expense("Leisure", 40.0),
        ];

        let buckets = category_buckets(TransactionKind::Expense, &transactions);

        let summary: Vec<_> = buckets
            .iter()
            .map(|bucket| (bucket.category.as_str(), bucket.total))
            .collect();
        assert_eq!(
            summary,
            vec![("Food", 50.0), ("Transport", 15.0), ("Leisure", 40.0)]
        );
    }

    #[test]
    fn colors_follow_the_palette_in_first_seen_order() {
        let transactions = vec![
            expense("Food", 20.0),
            expense("Transport", 15.0),
            expense("Food", 30.0),
        ];

        let buckets = category_buckets(TransactionKind::Expense, &transactions);

        assert_eq!(buckets[0].color, CATEGORY_PALETTE[0]);
        assert_eq!(buckets[1].color, CATEGORY_PALETTE[1]);
    }

    #[test]
    fn colors_wrap_around_when_the_palette_runs_out() {
        let transactions: Vec<_> = (0..9)
            .map(|n| expense(&format!("Category {n}"), 1.0))
            .collect();

        let buckets = category_buckets(TransactionKind::Expense, &transactions);

        assert_eq!(buckets[7].color, CATEGORY_PALETTE[0]);
        assert_eq!(buckets[8].color, CATEGORY_PALETTE[1]);
    }

    #[test]
    fn only_the_requested_kind_is_counted() {
        let mut income = expense("Salary", 1000.0);
        income.kind = TransactionKind::Income;
        let transactions = vec![income, expense("Food", 20.0)];

        let buckets = category_buckets(TransactionKind::Expense, &transactions);

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].category, "Food");
    }

    #[test]
    fn ranked_buckets_are_sorted_largest_first() {
        let transactions = vec![
            expense("Food", 20.0),
            expense("Transport", 65.0),
            expense("Leisure", 40.0),
        ];

        let buckets = ranked_category_buckets(TransactionKind::Expense, &transactions);

        let categories: Vec<_> = buckets
            .iter()
            .map(|bucket| bucket.category.as_str())
            .collect();
        assert_eq!(categories, vec!["Transport", "Leisure", "Food"]);
    }

    #[test]
    fn ranking_does_not_change_assigned_colors() {
        let transactions = vec![expense("Food", 20.0), expense("Transport", 65.0)];

        let buckets = ranked_category_buckets(TransactionKind::Expense, &transactions);

        // Transport ranks first but keeps the color it got as the second
        // category seen.
        assert_eq!(buckets[0].category, "Transport");
        assert_eq!(buckets[0].color, CATEGORY_PALETTE[1]);
    }
}
