//! Alert messages for displaying success and error feedback to users.
//!
//! Forms declare `hx-target-error="#alert-container"` so that error responses
//! land in the fixed alert container at the bottom of the page instead of
//! replacing the form.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// Alert message types for styling.
#[derive(Debug, Clone, Copy)]
pub enum AlertType {
    Success,
    Error,
}

/// An alert message with a heading and a line of detail.
pub struct AlertTemplate<'a> {
    pub alert_type: AlertType,
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> AlertTemplate<'a> {
    /// Create a new success alert.
    pub fn success(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Success,
            message,
            details,
        }
    }

    /// Create a new error alert.
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Error,
            message,
            details,
        }
    }

    /// Render the alert, including the script that reveals the container.
    pub fn into_markup(self) -> Markup {
        let color_style = match self.alert_type {
            AlertType::Success => {
                "bg-green-100 border-green-400 text-green-800 \
                dark:bg-green-900 dark:border-green-600 dark:text-green-200"
            }
            AlertType::Error => {
                "bg-red-100 border-red-400 text-red-800 \
                dark:bg-red-900 dark:border-red-600 dark:text-red-200"
            }
        };

        html! {
            div
                class={ "flex items-start gap-2 border rounded px-4 py-3 shadow " (color_style) }
                role="alert"
            {
                div class="flex-1"
                {
                    p class="font-bold" { (self.message) }

                    @if !self.details.is_empty()
                    {
                        p class="text-sm" { (self.details) }
                    }
                }

                button
                    type="button"
                    class="font-bold cursor-pointer"
                    aria-label="Dismiss"
                    onclick="document.getElementById('alert-container').classList.add('hidden')"
                {
                    "✕"
                }
            }

            script
            {
                "document.getElementById('alert-container').classList.remove('hidden');"
            }
        }
    }
}

/// Render `alert` as an HTTP response with `status_code`.
pub fn render_alert(status_code: StatusCode, alert: AlertTemplate) -> Response {
    (status_code, Html(alert.into_markup().into_string())).into_response()
}

#[cfg(test)]
mod alert_tests {
    use super::AlertTemplate;

    #[test]
    fn error_alert_contains_message_and_details() {
        let markup = AlertTemplate::error("Something broke", "here is why").into_markup();

        let html = markup.into_string();
        assert!(html.contains("Something broke"));
        assert!(html.contains("here is why"));
    }

    #[test]
    fn detail_paragraph_is_omitted_when_empty() {
        let html = AlertTemplate::success("Saved", "")
            .into_markup()
            .into_string();

        assert!(html.contains("Saved"));
        assert!(!html.contains("text-sm"));
    }
}
