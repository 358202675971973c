//! Generic error page and the 404 fallback. Neither carries service detail.

use axum::http::StatusCode;
use axum::response::Html;

use crate::backend::pages::render::layout;

pub fn render_error() -> String {
    layout(
        "Something went wrong",
        "<h1>Sorry, something went wrong</h1>\n<p>Please try again in a moment.</p>\n<p><a href=\"/\">Back to sign in</a></p>",
    )
}

pub async fn error_page() -> Html<String> {
    Html(render_error())
}

pub async fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(layout("Not found", "<h1>Page not found</h1>\n<p><a href=\"/\">Home</a></p>")),
    )
}
