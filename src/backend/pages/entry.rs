//! `GET /`: the unauthenticated entry page.

use axum::response::Html;

use crate::backend::pages::render::{layout, notice_html};
use crate::client::Notice;

pub fn render_entry(notice: Option<&Notice>) -> String {
    let body = format!(
        r#"<h1>Account Portal</h1>
{notice}<section>
<h2>Sign in</h2>
<form method="post" action="/auth/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Sign in</button>
</form>
</section>
<section>
<h2>Create an account</h2>
<form method="post" action="/auth/signup">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" minlength="6" required></label>
<button type="submit">Sign up</button>
</form>
</section>
<section>
<h2>Forgot your password?</h2>
<form method="post" action="/auth/recover">
<label>Email <input type="email" name="email" required></label>
<button type="submit">Send recovery link</button>
</form>
</section>"#,
        notice = notice_html(notice),
    );
    layout("Sign in", &body)
}

pub async fn entry_page() -> Html<String> {
    Html(render_entry(None))
}
