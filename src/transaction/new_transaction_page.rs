//! Defines the route handler for the page for creating a new transaction.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
    timezone::local_date_today,
    transaction::categories::{EXPENSE_CATEGORIES, INCOME_CATEGORIES},
};

// Swaps the category drop-down to match the selected transaction kind.
const KIND_TOGGLE_SCRIPT: &str = "\
    const isIncome = this.form.elements['kind'].value === 'income';
    document.getElementById('income-categories').hidden = !isIncome;
    document.getElementById('income-categories').disabled = !isIncome;
    document.getElementById('expense-categories').hidden = isIncome;
    document.getElementById('expense-categories').disabled = isIncome;";

fn new_transaction_view(max_date: Date) -> Markup {
    let create_transaction_route = endpoints::TRANSACTIONS_API;
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(create_transaction_route)
                hx-target-error="#alert-container"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Type" }

                    div class=(FORM_RADIO_GROUP_STYLE)
                    {
                        label class="flex items-center gap-2"
                        {
                            input
                                type="radio"
                                name="kind"
                                value="expense"
                                checked
                                onchange=(KIND_TOGGLE_SCRIPT)
                                class=(FORM_RADIO_INPUT_STYLE);

                            span class=(FORM_RADIO_LABEL_STYLE) { "Expense" }
                        }

                        label class="flex items-center gap-2"
                        {
                            input
                                type="radio"
                                name="kind"
                                value="income"
                                onchange=(KIND_TOGGLE_SCRIPT)
                                class=(FORM_RADIO_INPUT_STYLE);

                            span class=(FORM_RADIO_LABEL_STYLE) { "Income" }
                        }
                    }
                }

                div
                {
                    label
                        for="amount"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Amount"
                    }

                    // w-full needed to ensure input takes the full width when prefilled with a value
                    div class="input-wrapper w-full"
                    {
                        input
                            name="amount"
                            id="amount"
                            type="number"
                            step="0.01"
                            min="0.01"
                            placeholder="0.00"
                            required
                            autofocus
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label
                        for="date"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Date"
                    }

                    input
                        name="date"
                        id="date"
                        type="date"
                        max=(max_date)
                        required
                        value=(max_date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label
                        for="description"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Description"
                    }

                    input
                        name="description"
                        id="description"
                        type="text"
                        placeholder="Description"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label
                        for="expense-categories"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Category"
                    }

                    select
                        name="category"
                        id="expense-categories"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for category in EXPENSE_CATEGORIES {
                            option value=(category) { (category) }
                        }
                    }

                    select
                        name="category"
                        id="income-categories"
                        hidden
                        disabled
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for category in INCOME_CATEGORIES {
                            option value=(category) { (category) }
                        }
                    }
                }

                div
                {
                    label
                        for="installments"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Installments"
                    }

                    input
                        name="installments"
                        id="installments"
                        type="number"
                        min="1"
                        step="1"
                        value="1"
                        class=(FORM_TEXT_INPUT_STYLE);

                    p class="mt-1 text-xs text-gray-600 dark:text-gray-400"
                    {
                        "More than one records the full amount once a month, on the
                        same day each month."
                    }
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Create Transaction"
                }
            }
        }
    };

    base("Create Transaction", &[dollar_input_styles()], &content)
}

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for creating a transaction.
pub async fn get_new_transaction_page(
    State(state): State<NewTransactionPageState>,
) -> Result<Response, Error> {
    let max_date = local_date_today(&state.local_timezone)?;

    Ok(new_transaction_view(max_date).into_response())
}
