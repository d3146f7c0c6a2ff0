/// Presentation helpers
///
/// Pure functions invoked at the response boundary. Entities stay plain
/// data records: anything derived for display (the user's full name, the
/// HTML-escaped multiline text, the public log path) is computed here and
/// only here. Storage never contains escaped text.

use chrono::{DateTime, Utc};

/// Escapes text for embedding in HTML
///
/// Replaces `&`, `<`, `>`, `"` and `'` with their entities.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Inserts `<br />` before every newline, preserving the newline itself
pub fn nl2br(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                out.push_str("<br />\r");
                // consume a following \n as part of the same break
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    out.push('\n');
                }
            }
            '\n' => out.push_str("<br />\n"),
            c => out.push(c),
        }
    }

    out
}

/// Renders stored multiline text for HTML display: escape, then nl2br
///
/// The escape must come first so inserted `<br />` tags survive.
pub fn render_multiline(input: &str) -> String {
    nl2br(&escape_html(input))
}

/// Returns text for an edit form: stored plain text with any literal
/// `<br/>` leftovers removed
pub fn edit_text(input: &str) -> String {
    input.replace("<br/>", "")
}

/// Truncates a description for list views
///
/// Text longer than 300 characters is cut at 299 with a trailing ellipsis.
pub fn short_description(input: &str) -> String {
    let stripped = edit_text(input);
    if stripped.chars().count() > 300 {
        let truncated: String = stripped.chars().take(299).collect();
        format!("{truncated}...")
    } else {
        stripped
    }
}

/// Joins the optional name parts into a display name
///
/// Falls back to the username when both parts are absent.
pub fn display_name(first_name: Option<&str>, last_name: Option<&str>, username: &str) -> String {
    match (first_name, last_name) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        (Some(first), None) => first.to_string(),
        (None, Some(last)) => last.to_string(),
        (None, None) => username.to_string(),
    }
}

/// Builds the public path for a log: `<base-url>/logs/<slug>`
pub fn log_path(base_url: &str, slug: &str) -> String {
    format!("{}/logs/{}", base_url.trim_end_matches('/'), slug)
}

/// Humanizes the last login timestamp
///
/// Empty string when the user has never logged in.
pub fn last_login_display(last_login_at: Option<DateTime<Utc>>) -> String {
    let Some(at) = last_login_at else {
        return String::new();
    };

    let seconds = (Utc::now() - at).num_seconds().max(0);
    match seconds {
        0..=59 => "just now".to_string(),
        60..=3599 => {
            let minutes = seconds / 60;
            format!("{} minute{} ago", minutes, plural(minutes))
        }
        3600..=86399 => {
            let hours = seconds / 3600;
            format!("{} hour{} ago", hours, plural(hours))
        }
        _ => {
            let days = seconds / 86400;
            format!("{} day{} ago", days, plural(days))
        }
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
