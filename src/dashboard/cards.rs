//! Card components for the dashboard.
//!
//! Provides the row of headline statistic cards (income, expenses, balance,
//! percent of income spent) and the insights panel with its dismiss buttons.

use maud::{Markup, html};

use crate::{
    dashboard::{
        filter::PeriodFilter,
        insights::{Insight, Severity},
        stats::PeriodStats,
    },
    endpoints,
    html::format_currency,
};

/// Renders the row of headline statistic cards for the selected period.
pub(super) fn stat_cards_view(stats: &PeriodStats) -> Markup {
    let balance_color = if stats.balance < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    };

    html! {
        section class="w-full mx-auto mb-4" {
            div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4" {
                (stat_card("Income", &format_currency(stats.income), "text-green-600 dark:text-green-400"))
                (stat_card("Expenses", &format_currency(stats.expense), "text-red-600 dark:text-red-400"))
                (stat_card("Balance", &format_currency(stats.balance), balance_color))

                div class="bg-white dark:bg-gray-800 border border-gray-200
                    dark:border-gray-700 rounded-lg p-4 shadow-md"
                {
                    div class="text-sm text-gray-600 dark:text-gray-400 mb-1" {
                        "Income spent"
                    }
                    div class="text-3xl font-bold mb-2" {
                        (stats.percent_spent) "%"
                    }
                    (progress_bar(stats.percent_spent as f64))
                }
            }
        }
    }
}

fn stat_card(label: &str, value: &str, value_style: &str) -> Markup {
    html! {
        div class="bg-white dark:bg-gray-800 border border-gray-200
            dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            div class="text-sm text-gray-600 dark:text-gray-400 mb-1" { (label) }
            div class=(format!("text-3xl font-bold {value_style}")) { (value) }
        }
    }
}

/// Renders a horizontal progress bar showing a percentage.
pub(super) fn progress_bar(percentage: f64) -> Markup {
    let clamped = percentage.clamp(0.0, 100.0);

    // Ensure minimum 3% width so rounded corners are visible
    let display_percentage = if clamped > 0.0 && clamped < 3.0 {
        3.0
    } else {
        clamped
    };

    html! {
        div
            class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5 mb-2"
            role="progressbar"
            aria-valuenow=(format!("{clamped:.0}"))
            aria-valuemin="0"
            aria-valuemax="100"
        {
            @if clamped > 0.0 {
                div
                    class="bg-blue-600 dark:bg-blue-500 h-2.5 rounded-full transition-all"
                    style=(format!("width: {:.1}%", display_percentage))
                {}
            }
        }
    }
}

/// Renders the insights panel.
///
/// Each insight carries a dismiss button that posts its key back to the
/// server. The hidden inputs repeat the active period filter so the refreshed
/// panel is computed over the same transactions the user is looking at.
pub(super) fn insights_panel(insights: &[Insight], filter: &PeriodFilter) -> Markup {
    html! {
        section id="insights" class="w-full mx-auto mb-4" {
            @if !insights.is_empty() {
                div class="flex flex-col gap-3" {
                    @for insight in insights {
                        (insight_card(insight, filter))
                    }
                }
            }
        }
    }
}

fn insight_card(insight: &Insight, filter: &PeriodFilter) -> Markup {
    let (container_style, title_style) = match insight.severity {
        Severity::Info => (
            "bg-blue-50 border-blue-200 dark:bg-blue-900/20 dark:border-blue-800",
            "text-blue-800 dark:text-blue-300",
        ),
        Severity::Success => (
            "bg-green-50 border-green-200 dark:bg-green-900/20 dark:border-green-800",
            "text-green-800 dark:text-green-300",
        ),
        Severity::Warning => (
            "bg-yellow-50 border-yellow-200 dark:bg-yellow-900/20 dark:border-yellow-800",
            "text-yellow-800 dark:text-yellow-300",
        ),
    };

    html! {
        div
            class=(format!("flex items-start justify-between gap-4 rounded-lg border p-4 shadow-sm {container_style}"))
            role="status"
        {
            div {
                h4 class=(format!("font-semibold {title_style}")) { (insight.title) }
                p class="text-sm text-gray-700 dark:text-gray-300" { (insight.description) }
            }

            form
                hx-post=(endpoints::DISMISS_INSIGHT)
                hx-target="#insights"
                hx-target-error="#alert-container"
                hx-swap="outerHTML"
            {
                input type="hidden" name="key" value=(insight.key);
                @if let Some(month) = filter.month {
                    input type="hidden" name="month" value=((month as u8));
                }
                @if let Some(year) = filter.year {
                    input type="hidden" name="year" value=(year);
                }
                @if let Some(search) = &filter.search {
                    input type="hidden" name="search" value=(search);
                }

                button
                    type="submit"
                    class="text-gray-400 hover:text-gray-600 dark:hover:text-gray-200"
                    aria-label=(format!("Dismiss {}", insight.title))
                {
                    "✕"
                }
            }
        }
    }
}
