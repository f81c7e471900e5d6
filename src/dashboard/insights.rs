//! Generates the short list of insights shown beside the dashboard charts.
//!
//! Insights are recomputed from scratch on every request. Rules run in a
//! fixed order and the panel shows at most three, so the most important
//! observations (big category shares) always win over the generic ones.

use std::collections::HashSet;

use crate::dashboard::{CategoryBucket, PeriodStats};

/// The most insights shown at once.
pub const MAX_VISIBLE_INSIGHTS: usize = 3;

/// An expense category triggers a warning above this share of total spending.
const CATEGORY_SHARE_WARNING: f64 = 0.4;

/// Spending above this percentage of income triggers a warning.
const SPENDING_LIMIT_PERCENT: i64 = 80;

/// How strongly an insight should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Neutral information.
    Info,
    /// Good news.
    Success,
    /// Something worth a closer look.
    Warning,
}

/// One observation about the user's finances for the selected period.
#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    /// A stable identifier for the insight.
    ///
    /// Dismissals are stored as a set of these keys, so the key must not
    /// change between requests that would generate the same insight. Keys are
    /// the rule name, plus the category for per-category rules.
    pub key: String,
    /// How strongly to style the insight.
    pub severity: Severity,
    /// A short heading.
    pub title: String,
    /// A sentence of detail.
    pub description: String,
}

/// Run the insight rules over the period's aggregates.
///
/// `record_count` is the user's total number of transactions before any
/// filtering; a brand-new user gets a welcome message instead of finance
/// observations. `dismissed` holds the keys the user has dismissed this
/// session: those are dropped before the list is cut down to
/// [MAX_VISIBLE_INSIGHTS], so dismissing an insight reveals the next one in
/// rule order.
pub fn generate_insights(
    record_count: usize,
    stats: &PeriodStats,
    expense_buckets: &[CategoryBucket],
    dismissed: &HashSet<String>,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    if record_count == 0 {
        insights.push(Insight {
            key: "welcome".to_string(),
            severity: Severity::Info,
            title: "Welcome!".to_string(),
            description: "Add your first transaction to start seeing insights about your money."
                .to_string(),
        });
    } else {
        for bucket in expense_buckets {
            if stats.expense > 0.0 && bucket.total / stats.expense > CATEGORY_SHARE_WARNING {
                let percent = (bucket.total / stats.expense * 100.0).round() as i64;
                insights.push(Insight {
                    key: format!("category-share:{}", bucket.category),
                    severity: Severity::Warning,
                    title: format!("High spending on {}", bucket.category),
                    description: format!(
                        "{} accounts for {percent}% of your spending this period.",
                        bucket.category
                    ),
                });
            }
        }

        if stats.balance > 0.0 {
            insights.push(Insight {
                key: "positive-balance".to_string(),
                severity: Severity::Success,
                title: "You're in the green".to_string(),
                description: "You earned more than you spent this period. Keep it up!".to_string(),
            });
        } else if stats.balance < 0.0 {
            insights.push(Insight {
                key: "negative-balance".to_string(),
                severity: Severity::Warning,
                title: "Spending exceeds income".to_string(),
                description: "You spent more than you earned this period.".to_string(),
            });
        }

        if stats.percent_spent > SPENDING_LIMIT_PERCENT {
            insights.push(Insight {
                key: "spending-limit".to_string(),
                severity: Severity::Warning,
                title: "Most of your income is spent".to_string(),
                description: format!(
                    "You have spent {}% of your income this period.",
                    stats.percent_spent
                ),
            });
        }
    }

    insights.retain(|insight| !dismissed.contains(&insight.key));
    insights.truncate(MAX_VISIBLE_INSIGHTS);
    insights
}
