/**
 * Password Recovery Handler
 *
 * `POST /auth/recover`. Asks the platform to email a recovery link that lands
 * on `/auth/confirm` with `type=recovery` and continues to `/account`.
 *
 * The page always shows the same notice, whether or not the address exists
 * and whether or not the platform answered, so accounts cannot be enumerated.
 */

use axum::{
    extract::{Form, State},
    response::Html,
};

use crate::backend::auth::handlers::types::{validate_email, RecoverForm};
use crate::backend::pages::entry::render_entry;
use crate::backend::routes::ACCOUNT_PATH;
use crate::backend::server::state::AppState;
use crate::client::Notice;
use crate::services::with_timeout;

pub const RECOVERY_NOTICE: &str = "If an account exists for that address, a recovery link is on its way";

pub async fn recover(State(state): State<AppState>, Form(form): Form<RecoverForm>) -> Html<String> {
    if validate_email(&form.email).is_ok() {
        let result = with_timeout(
            state.config.revalidate_timeout,
            state
                .auth
                .reset_password_for_email(form.email.trim(), ACCOUNT_PATH),
        )
        .await;
        if let Err(e) = result {
            tracing::warn!("Password recovery request failed: {}", e);
        }
    }

    Html(render_entry(Some(&Notice::info(RECOVERY_NOTICE))))
}
