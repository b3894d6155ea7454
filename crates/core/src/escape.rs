//! Neutralizes template interpolation delimiters in generated HTML.

/// Marker inserted between the two braces of a reserved pair.
pub const BREAK_MARKER: &str = "<wbr>";

/// Breaks every `{{` and `}}` pair with [`BREAK_MARKER`].
///
/// The marker renders as nothing, so the text looks the same, but the
/// template compiler no longer sees an interpolation. Runs of three or more
/// braces are broken between every pair, which keeps the function idempotent.
pub fn escape_template_tokens(html: &str) -> String {
    if !html.contains("{{") && !html.contains("}}") {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len() + 16);
    let mut chars = html.chars().peekable();
    while let Some(ch) = chars.next() {
        out.push(ch);
        if (ch == '{' || ch == '}') && chars.peek() == Some(&ch) {
            out.push_str(BREAK_MARKER);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaks_interpolation_delimiters() {
        assert_eq!(
            escape_template_tokens("<code>{{ msg }}</code>"),
            "<code>{<wbr>{ msg }<wbr>}</code>"
        );
    }

    #[test]
    fn leaves_single_braces_alone() {
        let css = "<pre>a { color: red }</pre>";
        assert_eq!(escape_template_tokens(css), css);
    }

    #[test]
    fn breaks_every_pair_in_a_run() {
        assert_eq!(escape_template_tokens("{{{"), "{<wbr>{<wbr>{");
        assert_eq!(escape_template_tokens("}}}}"), "}<wbr>}<wbr>}<wbr>}");
    }

    #[test]
    fn mixed_braces_are_not_reserved() {
        assert_eq!(escape_template_tokens("{}{}"), "{}{}");
    }

    #[test]
    fn is_idempotent() {
        for input in [
            "",
            "plain",
            "{{ a }}",
            "{{{b}}}",
            "x{{}}y{",
            "<p>{{ a }} and {{ b }}</p>",
        ] {
            let once = escape_template_tokens(input);
            assert_eq!(escape_template_tokens(&once), once, "input: {input:?}");
            assert!(!once.contains("{{") && !once.contains("}}"));
        }
    }
}
