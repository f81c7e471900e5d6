//! The paywall page and checkout return handler for lifetime access.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, base, link},
    user::{UserID, get_user_by_id, grant_lifetime_access},
};

/// The state needed for the paywall page and checkout return handler.
#[derive(Clone)]
pub struct PaymentState {
    /// The database connection for looking up and updating users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Where to send users who want to buy lifetime access.
    pub checkout_url: Option<String>,
    /// Whether the app is gated behind the lifetime access flag.
    pub require_lifetime_access: bool,
}

impl FromRef<AppState> for PaymentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            checkout_url: state.checkout_url.clone(),
            require_lifetime_access: state.require_lifetime_access,
        }
    }
}

/// Middleware that redirects users without lifetime access to the paywall.
///
/// Does nothing when `require_lifetime_access` is off, so self-hosted
/// deployments are not gated. Must run after the auth guard so the user ID
/// extension is present.
pub async fn paywall_guard(
    State(state): State<PaymentState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.require_lifetime_access {
        return next.run(request).await;
    }

    let Some(user_id) = request.extensions().get::<UserID>().copied() else {
        tracing::error!("paywall guard ran without a user ID extension");
        return Redirect::to(endpoints::LOG_IN_VIEW).into_response();
    };

    let has_access = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match get_user_by_id(user_id, &connection) {
            Ok(user) => user.lifetime_access,
            Err(error) => {
                tracing::error!("could not look up user {user_id}: {error}");
                return Redirect::to(endpoints::LOG_IN_VIEW).into_response();
            }
        }
    };

    if has_access {
        next.run(request).await
    } else {
        Redirect::to(endpoints::PAYWALL_VIEW).into_response()
    }
}

/// Renders the page offering lifetime access for purchase.
pub async fn get_paywall_page(
    State(state): State<PaymentState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let user = get_user_by_id(user_id, &connection)?;
    drop(connection);

    // The checkout provider pre-fills the buyer's email so the success
    // redirect can be matched back to the account.
    let checkout_link = state
        .checkout_url
        .as_deref()
        .map(|url| format!("{url}?email={}", user.email));

    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="max-w-md text-center space-y-4"
            {
                h2 class="text-2xl font-bold" { "Unlock ProcVisual" }

                p
                {
                    "Your trial has ended. Buy lifetime access once and keep \
                    tracking your money forever, no subscription."
                }

                @match checkout_link {
                    Some(url) => {
                        a
                            href=(url)
                            class=(format!("inline-block {BUTTON_PRIMARY_STYLE}"))
                        {
                            "Buy lifetime access"
                        }
                    }
                    None => {
                        p
                        {
                            "Checkout is not configured on this server. \
                            Contact the administrator to unlock your account."
                        }
                    }
                }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Paid already? "
                    (link(endpoints::CHECKOUT_SUCCESS, "Refresh your access"))
                }
            }
        }
    );

    Ok(base("Upgrade", &[], &content).into_response())
}

/// The route the checkout provider sends users back to after paying.
///
/// Grants the logged-in user lifetime access and sends them to the dashboard.
pub async fn get_checkout_success(
    State(state): State<PaymentState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    grant_lifetime_access(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not grant lifetime access: {error}"))?;
    drop(connection);

    tracing::info!("granted lifetime access to user {user_id}");

    Ok(Redirect::to(endpoints::DASHBOARD_VIEW).into_response())
}
