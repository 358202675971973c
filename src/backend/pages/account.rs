/**
 * Account Page
 *
 * `GET /account` renders the profile form for the revalidated principal.
 * `POST /account` validates the submitted fields and upserts the profile row
 * keyed by the principal id, then redirects back (303) so a reload does not
 * resubmit.
 *
 * Both handlers take `CurrentPrincipal`, so they never run for a session the
 * authentication service did not just confirm.
 */

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use secrecy::ExposeSecret;

use crate::backend::auth::CurrentPrincipal;
use crate::backend::error::BackendError;
use crate::backend::pages::render::{escape_html, layout, notice_html, page};
use crate::backend::routes::ACCOUNT_PATH;
use crate::backend::server::state::AppState;
use crate::client::Notice;
use crate::services::with_timeout;
use crate::shared::principal::{Principal, Profile, ProfileUpdate};

fn field(label: &str, name: &str, value: Option<&str>) -> String {
    format!(
        "<label>{} <input type=\"text\" name=\"{}\" value=\"{}\"></label>\n",
        escape_html(label),
        name,
        escape_html(value.unwrap_or_default())
    )
}

pub fn render_account(principal: &Principal, profile: &Profile, notice: Option<&Notice>) -> String {
    let mut body = String::from("<h1>Your account</h1>\n");
    body.push_str(&notice_html(notice));
    body.push_str("<form method=\"post\" action=\"/account\">\n");
    body.push_str(&format!(
        "<label>Email <input type=\"email\" value=\"{}\" disabled></label>\n",
        escape_html(principal.email.as_deref().unwrap_or_default())
    ));
    body.push_str(&field("Full name", "full_name", profile.full_name.as_deref()));
    body.push_str(&field("Username", "username", profile.username.as_deref()));
    body.push_str(&field("Website", "website", profile.website.as_deref()));
    body.push_str(&field("Avatar", "avatar_url", profile.avatar_url.as_deref()));
    body.push_str("<button type=\"submit\">Update</button>\n</form>\n");
    body.push_str(
        "<form method=\"post\" action=\"/auth/signout\">\n<button type=\"submit\">Sign out</button>\n</form>",
    );
    layout("Account", &body)
}

/// Account page handler
///
/// # Arguments
///
/// * `State(state)` - Platform services and configuration
/// * `current` - Principal revalidated for this request
///
/// # Errors
///
/// A failed profile lookup redirects to `/error`. A missing row is not an
/// error; the form renders empty.
pub async fn show_account(
    State(state): State<AppState>,
    current: CurrentPrincipal,
) -> Result<Html<String>, BackendError> {
    let profile = with_timeout(
        state.config.revalidate_timeout,
        state
            .profiles
            .get_profile(current.session.access_token.expose_secret(), current.principal.id),
    )
    .await?
    .unwrap_or_else(|| Profile::empty(current.principal.id));

    Ok(Html(render_account(&current.principal, &profile, None)))
}

/// Profile update handler
///
/// # Arguments
///
/// * `State(state)` - Platform services and configuration
/// * `current` - Principal revalidated for this request
/// * `Form(update)` - Submitted profile fields
///
/// # Returns
///
/// 303 to `/account` after a successful upsert, or the form again with a 400
/// and the validation message.
pub async fn save_account(
    State(state): State<AppState>,
    current: CurrentPrincipal,
    Form(update): Form<ProfileUpdate>,
) -> Result<Response, BackendError> {
    let submitted = update.clone();
    let profile = match update.into_profile(current.principal.id, Utc::now()) {
        Ok(profile) => profile,
        Err(e) => {
            tracing::info!("Rejected profile update for {}: {}", current.principal.id, e);
            let shown = Profile {
                id: current.principal.id,
                full_name: submitted.full_name,
                username: submitted.username,
                website: submitted.website,
                avatar_url: submitted.avatar_url,
                updated_at: None,
            };
            let html = render_account(&current.principal, &shown, Some(&Notice::from(&e)));
            return Ok(page(StatusCode::BAD_REQUEST, html));
        }
    };

    with_timeout(
        state.config.revalidate_timeout,
        state
            .profiles
            .upsert_profile(current.session.access_token.expose_secret(), &profile),
    )
    .await?;

    tracing::info!("Profile updated for {}", current.principal.id);
    Ok(Redirect::to(ACCOUNT_PATH).into_response())
}
