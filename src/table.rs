use std::borrow::Cow;
use std::fmt::Write as _;

pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut output = String::from("<table>\n");

    // Header
    output.push_str("  <thead><tr>");
    for header in headers {
        let _ = write!(output, "<th>{}</th>", escape_html(header));
    }
    output.push_str("</tr></thead>\n");

    // Rows
    output.push_str("  <tbody>\n");
    for row in rows {
        output.push_str("    <tr>");
        for idx in 0..column_count {
            let cell = row.get(idx).map(String::as_str).unwrap_or("");
            let _ = write!(output, "<td>{}</td>", escape_html(&sanitize_cell(cell)));
        }
        output.push_str("</tr>\n");
    }
    output.push_str("  </tbody>\n</table>\n");
    output
}

pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        let mut sanitized = String::with_capacity(value.len());
        for ch in value.chars() {
            match ch {
                '\n' | '\r' | '\t' => sanitized.push(' '),
                other => sanitized.push(other),
            }
        }
        Cow::Owned(sanitized)
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_replaces_markup_characters() {
        assert_eq!(
            escape_html("<b>\"R&D\"</b>"),
            "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt;"
        );
        assert!(matches!(escape_html("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn render_table_pads_short_rows() {
        let html = render_table(&["id", "title"], &[vec!["01005".to_string()]]);
        assert!(html.contains("<th>id</th><th>title</th>"));
        assert!(html.contains("<tr><td>01005</td><td></td></tr>"));
    }

    #[test]
    fn render_table_flattens_line_breaks() {
        let html = render_table(&["title"], &[vec!["Linear\nAlgebra".to_string()]]);
        assert!(html.contains("<td>Linear Algebra</td>"));
    }
}
