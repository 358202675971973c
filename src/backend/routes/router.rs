/**
 * Router Configuration
 *
 * Assembles every route into a single Axum router.
 *
 * # Layer Order
 *
 * The session interceptor is layered over the page and action routes. Static
 * files are nested after the layer is applied, so asset requests never reach
 * the authentication service. The interceptor additionally skips excluded
 * prefixes and image extensions on its own.
 */

use axum::routing::get;
use axum::{middleware, Router};
use tower_http::services::ServeDir;

use crate::backend::middleware::session_interceptor;
use crate::backend::pages::{account, entry, error};
use crate::backend::routes::api_routes::configure_auth_routes;
use crate::backend::routes::{ACCOUNT_PATH, ENTRY_PATH, ERROR_PATH};
use crate::backend::server::state::AppState;

/// Directory served under `/static`
pub const STATIC_DIR: &str = "public";

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Configuration and platform service handles
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        .route(ENTRY_PATH, get(entry::entry_page))
        .route(
            ACCOUNT_PATH,
            get(account::show_account).post(account::save_account),
        )
        .route(ERROR_PATH, get(error::error_page));

    let router = configure_auth_routes(router);

    // Everything above runs behind the session interceptor.
    let router = router.layer(middleware::from_fn_with_state(
        app_state.clone(),
        session_interceptor,
    ));

    let router = router
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(error::not_found);

    router.with_state(app_state)
}
