//! The login page served on `GET {location}/login`.

use crate::totp::CODE_FIELD;

/// Render the login form once from configuration values.
///
/// The title is escaped; the style is trusted operator CSS and goes verbatim
/// into the `<style>` element.
#[must_use]
pub fn render_login_page(title: &str, style: &str, action: &str) -> String {
    let title = escape_html(title);
    let action = escape_html(action);
    format!(
        r#"<html>
<head>
<title>{title}</title>
<style type="text/css">
{style}
</style>
</head>
<body>
<h1>{title}</h1>
<p>
<form action="{action}" method="POST">
<label for="{CODE_FIELD}">Enter one-time code:</label>
<input type="text" name="{CODE_FIELD}" id="{CODE_FIELD}" inputmode="numeric" autocomplete="one-time-code">
<input type="submit" value="Submit">
</form>
</p>
</body>
</html>
"#
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
