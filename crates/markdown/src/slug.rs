use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static COMBINING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{0300}-\u{036F}]").expect("valid combining regex"));
static CONTROL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{0000}-\u{001F}]").expect("valid control regex"));
static SPECIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[\s~`!@#$%^&*()\-_+=\[\]{}|\\;:"'“”‘’<>,.?/]+"#).expect("valid special regex")
});
static LEADING_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d)").expect("valid digit regex"));

/// Splits a `{#custom-id}` suffix off heading text.
///
/// The id may only contain ASCII alphanumerics, `-` and `_`; anything else
/// leaves the text untouched.
///
/// ```
/// use demopress_markdown::slug::extract_custom_id;
///
/// assert_eq!(extract_custom_id("Setup {#install}"), ("Setup", Some("install")));
/// assert_eq!(extract_custom_id("Plain"), ("Plain", None));
/// ```
pub fn extract_custom_id(text: &str) -> (&str, Option<&str>) {
    let trimmed = text.trim_end();
    let Some(inner) = trimmed.strip_suffix('}') else {
        return (text, None);
    };
    let Some(open) = inner.rfind("{#") else {
        return (text, None);
    };

    let id = &inner[open + 2..];
    if id.is_empty()
        || !id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return (text, None);
    }
    (inner[..open].trim_end(), Some(id))
}

/// Turns heading text into an anchor slug.
///
/// Punctuation and whitespace runs collapse to a single `-`, edge dashes are
/// dropped, and a leading digit gets a `_` prefix so the slug is a valid
/// selector. Text with nothing left after that becomes `heading`.
pub fn slugify(text: &str) -> String {
    let slug = COMBINING.replace_all(text, "");
    let slug = CONTROL.replace_all(&slug, "");
    let slug = SPECIAL.replace_all(&slug, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        return "heading".to_string();
    }
    LEADING_DIGIT.replace(slug, "_$1").to_lowercase()
}

/// Hands out per-document unique slugs.
///
/// Repeats get a numeric suffix: `intro`, `intro-1`, `intro-2`.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    /// Creates an empty slugger.
    pub fn new() -> Self {
        Self::default()
    }

    /// The next unique slug for `text`.
    pub fn next_slug(&mut self, text: &str) -> String {
        self.claim(slugify(text))
    }

    /// Claims `slug` verbatim when free, otherwise its next suffixed form.
    pub fn claim(&mut self, slug: String) -> String {
        let Some(&last) = self.seen.get(&slug) else {
            self.seen.insert(slug.clone(), 0);
            return slug;
        };

        let mut suffix = last;
        let candidate = loop {
            suffix += 1;
            let candidate = format!("{slug}-{suffix}");
            if !self.seen.contains_key(&candidate) {
                break candidate;
            }
        };
        self.seen.insert(slug, suffix);
        self.seen.insert(candidate.clone(), 0);
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_punctuation_and_whitespace() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  `code` & more  "), "code-more");
        assert_eq!(slugify("a -- b"), "a-b");
    }

    #[test]
    fn keeps_unicode_letters() {
        assert_eq!(slugify("按钮 Button"), "按钮-button");
        assert_eq!(slugify("zh-CN"), "zh-cn");
    }

    #[test]
    fn prefixes_leading_digits() {
        assert_eq!(slugify("1. Getting started"), "_1-getting-started");
    }

    #[test]
    fn strips_combining_marks() {
        assert_eq!(slugify("cafe\u{0301}"), "cafe");
    }

    #[test]
    fn punctuation_only_text_falls_back_to_heading() {
        assert_eq!(slugify("!!!"), "heading");
        assert_eq!(slugify(""), "heading");

        let mut slugger = Slugger::new();
        assert_eq!(slugger.next_slug("???"), "heading");
        assert_eq!(slugger.next_slug("..."), "heading-1");
    }

    #[test]
    fn repeats_get_numeric_suffixes() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.next_slug("Usage"), "usage");
        assert_eq!(slugger.next_slug("Usage"), "usage-1");
        assert_eq!(slugger.next_slug("Usage"), "usage-2");
        assert_eq!(slugger.next_slug("Usage 1"), "usage-1-1");
    }

    #[test]
    fn claimed_ids_block_generated_ones() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.claim("api".to_string()), "api");
        assert_eq!(slugger.next_slug("API"), "api-1");
    }

    #[test]
    fn custom_id_requires_safe_characters() {
        assert_eq!(extract_custom_id("Title {#my_id-2}"), ("Title", Some("my_id-2")));
        assert_eq!(extract_custom_id("Title {#bad id}"), ("Title {#bad id}", None));
        assert_eq!(extract_custom_id("Title {#}"), ("Title {#}", None));
        assert_eq!(extract_custom_id("Set {a}"), ("Set {a}", None));
    }
}
