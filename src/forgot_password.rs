//! The forgot-password page and the request handler that emails reset instructions.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Mailer, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link, log_in_register,
    },
    user::get_user_by_email,
};

fn forgot_password_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::FORGOT_PASSWORD_API)
            class="space-y-4 md:space-y-6"
        {
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Enter the email address you registered with and we will send \
                you instructions for resetting your password."
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    type="email"
                    name="email"
                    id="email"
                    placeholder="name@company.com"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Send instructions" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Remembered it after all? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

/// Renders the page for requesting password reset instructions.
pub async fn get_forgot_password_page() -> Response {
    let content = log_in_register("Reset your password", &forgot_password_form());

    base("Forgot Password", &[], &content).into_response()
}

/// The state needed to send password reset instructions.
#[derive(Clone)]
pub struct ForgotPasswordState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Sends the reset instructions email. `None` disables email.
    pub mailer: Option<Mailer>,
}

impl FromRef<AppState> for ForgotPasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            mailer: state.mailer.clone(),
        }
    }
}

/// The email entered into the forgot-password form.
#[derive(Deserialize)]
pub struct ForgotPasswordForm {
    /// The email address to send reset instructions to.
    pub email: String,
}

/// Send password reset instructions to `email` if it belongs to a user.
///
/// The response is the same whether or not the email is registered, so the
/// form cannot be used to probe which addresses have accounts.
pub async fn post_forgot_password(
    State(state): State<ForgotPasswordState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let user = state
        .db_connection
        .lock()
        .ok()
        .and_then(|connection| get_user_by_email(&form.email, &connection).ok());

    if let (Some(user), Some(mailer)) = (user, state.mailer) {
        // SMTP is blocking, keep it off the async runtime.
        tokio::task::spawn_blocking(move || {
            mailer.send_password_reset_instructions(&user.email, &user.name)
        });
    }

    confirmation_view().into_response()
}

fn confirmation_view() -> Markup {
    html! {
        p class="text-sm text-gray-900 dark:text-white"
        {
            "If that email address belongs to an account, password reset \
            instructions are on their way. Check your inbox."
        }
    }
}

#[cfg(test)]
mod forgot_password_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, body::Body, extract::State, http::Response};
    use rusqlite::Connection;
    use scraper::Html;

    use crate::{
        PasswordHash,
        user::{create_user, create_user_table},
    };

    use super::{
        ForgotPasswordForm, ForgotPasswordState, get_forgot_password_page, post_forgot_password,
    };

    fn get_test_state(with_user: bool) -> ForgotPasswordState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        if with_user {
            create_user(
                "Test User",
                "test@test.com",
                None,
                PasswordHash::new_unchecked("hunter2"),
                &connection,
            )
            .expect("Could not create test user");
        }

        ForgotPasswordState {
            db_connection: Arc::new(Mutex::new(connection)),
            mailer: None,
        }
    }

    async fn parse_html(response: Response<Body>) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_fragment(&text)
    }

    #[tokio::test]
    async fn page_displays_email_form() {
        let response = get_forgot_password_page().await;

        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();
        let document = Html::parse_document(&text);

        let input_selector = scraper::Selector::parse("input[type=email][name=email]").unwrap();
        assert_eq!(document.select(&input_selector).count(), 1);
    }

    #[tokio::test]
    async fn response_is_the_same_for_known_and_unknown_emails() {
        let known = post_forgot_password(
            State(get_test_state(true)),
            Form(ForgotPasswordForm {
                email: "test@test.com".to_string(),
            }),
        )
        .await;
        let unknown = post_forgot_password(
            State(get_test_state(true)),
            Form(ForgotPasswordForm {
                email: "nobody@test.com".to_string(),
            }),
        )
        .await;

        let known_html = parse_html(known).await.html();
        let unknown_html = parse_html(unknown).await.html();

        assert_eq!(known_html, unknown_html);
        assert!(known_html.contains("instructions are on their way"));
    }
}
