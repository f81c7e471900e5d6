//! Cookie-based session authentication.
//!
//! Sessions are a pair of private cookies (the user ID and an expiry stamp)
//! set on log in and checked by the [auth_guard] middleware on every
//! protected route.

pub(crate) mod cookie;
mod middleware;

pub use middleware::{AuthState, auth_guard, auth_guard_hx};
