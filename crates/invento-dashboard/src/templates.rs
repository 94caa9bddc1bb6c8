//! HTML building blocks for the dashboard pages.
//!
//! Plain `format!` templates styled by the embedded `/static/app.css`.
//! Anything user-supplied must go through [`html_escape`] first.

use crate::session::{Flash, FlashLevel, SessionUser};

/// Base HTML layout wrapper.
pub fn layout(title: &str, user: Option<&SessionUser>, flashes: &[Flash], content: &str) -> String {
    let nav = match user {
        Some(user) => {
            let activity_link = if user.role.is_admin() {
                r#"<a href="/activity">Activity</a>"#
            } else {
                ""
            };
            format!(
                r#"<nav class="top">
        <a href="/" class="brand">Invento</a>
        <div>
            <span>{username} ({role})</span>
            <a href="/">Inventory</a>
            {activity_link}
            <a href="/logout">Log out</a>
        </div>
    </nav>"#,
                username = html_escape(&user.username),
                role = user.role,
            )
        }
        None => r#"<nav class="top"><span class="brand">Invento</span></nav>"#.to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Invento</title>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body>
    {nav}
    <main>
        {flashes}
        {content}
    </main>
</body>
</html>"#,
        title = html_escape(title),
        flashes = flash_messages(flashes),
    )
}

/// Flash messages, newest last.
pub fn flash_messages(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|f| {
            let class = match f.level {
                FlashLevel::Success => "success",
                FlashLevel::Error => "error",
            };
            format!(
                r#"<div class="flash {class}">{}</div>"#,
                html_escape(&f.message)
            )
        })
        .collect()
}

/// Card component.
pub fn card(title: &str, content: &str) -> String {
    format!(
        r#"<section class="card">
            <h3>{title}</h3>
            <div class="body">
                {content}
            </div>
        </section>"#
    )
}

/// Badge component.
pub fn badge(text: &str, color: &str) -> String {
    format!(r#"<span class="badge {color}">{text}</span>"#)
}

/// Table component. Cells are inserted as-is.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let headers_html: String = headers.iter().map(|h| format!("<th>{h}</th>")).collect();

    let rows_html: String = rows
        .iter()
        .map(|row| {
            let cells: String = row.iter().map(|cell| format!("<td>{cell}</td>")).collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();

    format!(
        r#"<table>
            <thead><tr>{headers_html}</tr></thead>
            <tbody>{rows_html}</tbody>
        </table>"#
    )
}

/// Empty state component.
pub fn empty_state(title: &str, description: &str) -> String {
    format!(
        r#"<div class="empty">
            <strong>{title}</strong>
            <p>{description}</p>
        </div>"#
    )
}

/// Hidden form field carrying the CSRF token.
pub fn csrf_input(token: &str) -> String {
    format!(
        r#"<input type="hidden" name="csrf_token" value="{}">"#,
        html_escape(token)
    )
}

/// Standalone page for unexpected failures.
pub fn error_page(message: &str) -> String {
    layout(
        "Error",
        None,
        &[],
        &card(
            "Something went wrong",
            &format!(r#"<p>{}</p><p><a href="/">Back to inventory</a></p>"#, html_escape(message)),
        ),
    )
}

/// Simple HTML escape function
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
