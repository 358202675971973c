//! HTML helpers shared by the pages.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::client::{Notice, NoticeKind};

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap `body` in the shared document shell
pub fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<link rel=\"stylesheet\" href=\"/static/style.css\">\n</head>\n\
         <body>\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape_html(title),
        body = body,
    )
}

pub fn notice_html(notice: Option<&Notice>) -> String {
    match notice {
        Some(notice) => {
            let class = match notice.kind {
                NoticeKind::Info => "notice info",
                NoticeKind::Error => "notice error",
            };
            format!(
                "<p class=\"{}\" role=\"status\">{}</p>\n",
                class,
                escape_html(&notice.message)
            )
        }
        None => String::new(),
    }
}

/// HTML response with an explicit status
pub fn page(status: StatusCode, html: String) -> Response {
    (status, Html(html)).into_response()
}
