//! Dashboard module
//!
//! Provides an overview page showing summary statistics, insights, and charts
//! for a selected reporting period, plus the income and expense detail pages.
//! All aggregation starts from the user's full transaction list and narrows it
//! down with a [PeriodFilter].

mod cards;
mod categories;
pub(crate) mod charts;
mod filter;
mod handlers;
mod insights;
mod reports;
mod series;
mod stats;

pub use categories::{CategoryBucket, category_buckets, ranked_category_buckets};
pub use filter::PeriodFilter;
pub use handlers::{DashboardState, PeriodQuery, dismiss_insight, get_dashboard_page};
pub(crate) use handlers::{filter_bar, period_label};
pub use insights::{Insight, Severity, generate_insights};
pub use reports::{get_expenses_page, get_income_page};
pub use series::{TimeSeriesPoint, daily_series, monthly_series};
pub use stats::{PeriodStats, period_stats};
