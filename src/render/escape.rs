/// Escapes text for use in element content and quoted attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reduces an HTML error snippet from the cart to plain text.
///
/// Tags are dropped, the common entities are decoded and whitespace runs
/// collapse to a single space.
pub fn strip_html(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_script_tags() {
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;"
        );
    }

    #[test]
    fn escapes_ampersand_and_quotes() {
        assert_eq!(escape_html(r#"A & "B""#), "A &amp; &quot;B&quot;");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(escape_html("Plain title 42"), "Plain title 42");
    }

    #[test]
    fn strip_removes_tags_and_decodes_entities() {
        assert_eq!(
            strip_html("<p>Only <strong>2</strong> left &amp; going</p>"),
            "Only 2 left & going"
        );
    }

    #[test]
    fn strip_keeps_plain_messages() {
        assert_eq!(strip_html("Out of stock"), "Out of stock");
    }

    #[test]
    fn strip_decodes_escaped_markup_to_text() {
        assert_eq!(strip_html("&lt;b&gt;x&lt;/b&gt;"), "<b>x</b>");
    }
}
