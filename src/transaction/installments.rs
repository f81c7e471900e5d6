//! Expands a transaction draft into a series of monthly installments.

use time::{Date, Month, util::days_in_year_month};

use crate::transaction::TransactionDraft;

/// How the entered amount is distributed across installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallmentPolicy {
    /// Every installment carries the full entered amount. A $300 purchase in
    /// three installments records $300 three times, matching how card issuers
    /// bill recurring installments.
    #[default]
    RepeatFullAmount,
    /// The entered amount is divided evenly across the installments. Not
    /// offered on the entry form, but available to callers that want it.
    SplitEvenly,
}

/// Expand `draft` into `count` drafts on consecutive calendar months.
///
/// The first installment keeps the draft's date and each later one lands one
/// calendar month after the previous. When the target month is too short for
/// the day-of-month, the day is clamped to the month's last day, so January
/// 31st is followed by February 28th (or 29th in a leap year).
///
/// Each installment's description is suffixed with its 1-indexed position,
/// e.g. `"Laptop (2/3)"`. A count of zero or one returns the draft unchanged.
pub fn expand_installments(
    draft: &TransactionDraft,
    count: u32,
    policy: InstallmentPolicy,
) -> Vec<TransactionDraft> {
    if count <= 1 {
        return vec![draft.clone()];
    }

    let amount = match policy {
        InstallmentPolicy::RepeatFullAmount => draft.amount,
        InstallmentPolicy::SplitEvenly => draft.amount / count as f64,
    };

    (0..count)
        .map(|offset| TransactionDraft {
            kind: draft.kind,
            amount,
            category: draft.category.clone(),
            date: months_ahead(draft.date, offset),
            description: format!("{} ({}/{})", draft.description, offset + 1, count),
        })
        .collect()
}

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// The date `months` calendar months after `date`, clamping the day-of-month
/// to the target month's last day.
fn months_ahead(date: Date, months: u32) -> Date {
    let month_index = date.month() as u32 - 1 + months;
    let year = date.year() + (month_index / 12) as i32;
    let month = MONTHS[(month_index % 12) as usize];
    let day = date.day().min(days_in_year_month(year, month));

    // The day is clamped above, so this cannot fail for representable years.
    Date::from_calendar_date(year, month, day).unwrap_or(date)
}
