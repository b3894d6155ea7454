//! Page metadata derivation: title, description, escaped content, paths.

use crate::sanitize::deeply_parse_header;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use std::path::Path;

static FIRST_H1: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*#\s+(.*)\s*$").expect("valid heading regex"));

/// Resolves the page title.
///
/// Exactly one branch applies, in this order: a truthy `home` flag yields
/// `"Home"`; a truthy `title` field is deep-sanitized; otherwise the first
/// `# ` heading line of the body is deep-sanitized; otherwise `""`.
pub fn infer_title(frontmatter: &Map<String, JsonValue>, body: &str) -> String {
    if frontmatter.get("home").is_some_and(is_truthy) {
        return "Home".to_string();
    }
    if let Some(title) = frontmatter.get("title").filter(|v| is_truthy(v)) {
        return deeply_parse_header(&value_to_text(title));
    }
    FIRST_H1
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|heading| deeply_parse_header(heading.as_str().trim()))
        .unwrap_or_default()
}

/// Finds the description in the frontmatter `head` list.
///
/// Entries look like `["meta", { "name": "description", "content": "…" }]`;
/// the first one with a non-empty string `content` wins.
pub fn infer_description(frontmatter: &Map<String, JsonValue>) -> String {
    let Some(head) = frontmatter.get("head").and_then(JsonValue::as_array) else {
        return String::new();
    };

    head.iter()
        .filter_map(JsonValue::as_array)
        .find_map(|entry| {
            let tag = entry.first()?.as_str()?;
            let attrs = entry.get(1)?.as_object()?;
            let name = attrs.get("name").and_then(JsonValue::as_str);
            let content = attrs.get("content").and_then(JsonValue::as_str)?;
            (tag == "meta" && name == Some("description") && !content.is_empty())
                .then(|| content.to_string())
        })
        .unwrap_or_default()
}

/// HTML-escapes the markdown body for search snippets.
pub fn escape_content(body: &str) -> String {
    html_escape::encode_quoted_attribute(body).into_owned()
}

/// Path of `file` relative to `root`, always `/`-separated.
///
/// A file outside `root` keeps its own path.
pub fn relative_path(file: &Path, root: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative.to_string_lossy().replace('\\', "/")
}

/// JavaScript-style truthiness for frontmatter flags.
pub(crate) fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(flag) => *flag,
        JsonValue::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        JsonValue::String(text) => !text.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

fn value_to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: JsonValue) -> Map<String, JsonValue> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn home_flag_wins_over_title() {
        let fm = map(json!({ "home": true, "title": "T" }));
        assert_eq!(infer_title(&fm, "# Heading"), "Home");
    }

    #[test]
    fn frontmatter_title_is_sanitized() {
        let fm = map(json!({ "title": "**T** <Badge/>" }));
        assert_eq!(infer_title(&fm, "# Heading"), "T");
    }

    #[test]
    fn falsy_home_and_title_fall_through() {
        let fm = map(json!({ "home": false, "title": "" }));
        assert_eq!(infer_title(&fm, "# Hello"), "Hello");
    }

    #[test]
    fn non_string_title_is_stringified() {
        let fm = map(json!({ "title": 2024 }));
        assert_eq!(infer_title(&fm, ""), "2024");
    }

    #[test]
    fn first_top_level_heading_is_used() {
        let body = "intro\n\n## Not this\n\n# Hello `world`\n\n# Second";
        assert_eq!(infer_title(&Map::new(), body), "Hello world");
    }

    #[test]
    fn no_title_source_yields_empty() {
        assert_eq!(infer_title(&Map::new(), "## only h2\ntext"), "");
    }

    #[test]
    fn description_requires_meta_description_with_content() {
        let author = map(json!({ "head": [["meta", { "name": "author", "content": "X" }]] }));
        assert_eq!(infer_description(&author), "");

        let described =
            map(json!({ "head": [["meta", { "name": "description", "content": "Y" }]] }));
        assert_eq!(infer_description(&described), "Y");
    }

    #[test]
    fn description_skips_empty_and_non_meta_entries() {
        let fm = map(json!({
            "head": [
                ["link", { "name": "description", "content": "no" }],
                ["meta", { "name": "description", "content": "" }],
                "garbage",
                ["meta", { "name": "description", "content": "yes" }]
            ]
        }));
        assert_eq!(infer_description(&fm), "yes");
    }

    #[test]
    fn description_without_head_is_empty() {
        assert_eq!(infer_description(&map(json!({ "head": "nope" }))), "");
        assert_eq!(infer_description(&Map::new()), "");
    }

    #[test]
    fn content_is_html_escaped() {
        let escaped = escape_content("<b>\"a\" & 'b'</b>");
        assert!(escaped.starts_with("&lt;b&gt;"));
        assert!(escaped.contains(" &amp; "));
        assert!(!escaped.contains(['<', '>', '"', '\'']));
    }

    #[test]
    fn relative_path_uses_forward_slashes() {
        let root = Path::new("/site");
        let file = Path::new("/site/guide/intro.md");
        assert_eq!(relative_path(file, root), "guide/intro.md");
        assert_eq!(
            relative_path(Path::new("/other/a.md"), root),
            "/other/a.md"
        );
    }
}
