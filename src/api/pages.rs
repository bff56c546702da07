//! Server-rendered HTML pages
//!
//! Every value that originates from a user goes through
//! `html_escape` before it is placed in markup.

use axum::http::StatusCode;
use html_escape::encode_text;

use crate::data::Note;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - SafeNotes</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<main>
{body}
</main>
</body>
</html>
"#,
        title = encode_text(title),
    )
}

/// Error page. `message` is trusted markup produced by `AppError`.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let heading = status.canonical_reason().unwrap_or("Error");
    layout(
        heading,
        &format!(
            "<h1>{} {}</h1>\n<p class=\"error\">{}</p>",
            status.as_u16(),
            encode_text(heading),
            message
        ),
    )
}

/// Login page for anonymous visitors.
pub fn index_page() -> String {
    layout(
        "Login",
        r#"<h1>SafeNotes</h1>
<p>Log in, or pick a new username and password to register.</p>
<form method="post" action="/login">
<label>Username <input type="text" name="username" autocomplete="username" required></label>
<label>Password <input type="password" name="password" autocomplete="current-password" required></label>
<button type="submit">Login</button>
</form>"#,
    )
}

/// Note list and editor for `user`.
pub fn notes_page(user: &str, notes: &[Note]) -> String {
    let mut body = format!("<h1>Notes of {}</h1>\n", encode_text(user));

    if notes.is_empty() {
        body.push_str("<p>No notes yet.</p>\n");
    } else {
        body.push_str("<ul class=\"notes\">\n");
        for note in notes {
            body.push_str(&format!(
                "<li><h2>{}</h2><pre>{}</pre><small>updated {}</small></li>\n",
                encode_text(&note.title),
                encode_text(&note.text),
                note.updated_at.format("%Y-%m-%d %H:%M UTC"),
            ));
        }
        body.push_str("</ul>\n");
    }

    body.push_str(
        r#"<h2>Add or edit a note</h2>
<p>Saving a note with an existing title replaces its text.</p>
<form method="post" action="/notes">
<label>Title <input type="text" name="title" required></label>
<label>Text <textarea name="text" rows="6" required></textarea></label>
<button type="submit">Save</button>
</form>
<form method="post" action="/logout">
<button type="submit">Logout</button>
</form>"#,
    );

    layout("Notes", &body)
}
