/**
 * Authentication Action Routes
 *
 * Form posts and the email-link landing endpoint under `/auth`.
 *
 * # Routes
 *
 * - `POST /auth/login` - Password sign-in
 * - `POST /auth/signup` - Registration
 * - `POST /auth/signout` - Sign out (write-only)
 * - `POST /auth/recover` - Password-recovery email
 * - `GET /auth/confirm` - Token-hash exchange
 */

use axum::routing::{get, post};
use axum::Router;

use crate::backend::auth::{confirm, login, recover, signout, signup};
use crate::backend::routes::CONFIRM_PATH;
use crate::backend::server::state::AppState;

/// Configure authentication routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
///
/// # Returns
///
/// Router with the `/auth` routes configured
pub fn configure_auth_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/signout", post(signout))
        .route("/auth/recover", post(recover))
        .route(CONFIRM_PATH, get(confirm))
}
