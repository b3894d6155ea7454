//! Header text sanitizing.
//!
//! Titles and headings arrive with markdown and HTML artifacts still in them
//! (`**bold**`, `[link](url)`, `<Badge/>`, `&lt;`). The two pipelines here turn
//! them into plain text that can be embedded safely.
//!
//! - [`SHALLOW`] removes entities, link syntax, emphasis/code delimiters and
//!   backslash escapes, then trims.
//! - [`DEEP`] additionally strips raw HTML tags that are not wrapped in
//!   backticks before running the shallow steps.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// A named, pure text transform.
#[derive(Clone, Copy)]
pub struct Transform {
    /// Step name (for debugging and tests).
    pub name: &'static str,
    /// The transform itself.
    pub apply: for<'a> fn(&'a str) -> Cow<'a, str>,
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Transform").field(&self.name).finish()
    }
}

/// Shallow header pipeline.
pub const SHALLOW: &[Transform] = &[
    Transform {
        name: "unescape_html",
        apply: unescape_html,
    },
    Transform {
        name: "strip_markdown_links",
        apply: strip_markdown_links,
    },
    Transform {
        name: "strip_emphasis",
        apply: strip_emphasis,
    },
    Transform {
        name: "unescape_punctuation",
        apply: unescape_punctuation,
    },
    Transform {
        name: "trim",
        apply: trim,
    },
];

/// Deep header pipeline: raw HTML stripping followed by [`SHALLOW`].
pub const DEEP: &[Transform] = &[
    Transform {
        name: "strip_raw_html",
        apply: strip_raw_html,
    },
    Transform {
        name: "unescape_html",
        apply: unescape_html,
    },
    Transform {
        name: "strip_markdown_links",
        apply: strip_markdown_links,
    },
    Transform {
        name: "strip_emphasis",
        apply: strip_emphasis,
    },
    Transform {
        name: "unescape_punctuation",
        apply: unescape_punctuation,
    },
    Transform {
        name: "trim",
        apply: trim,
    },
];

/// Runs `steps` over `input` in order.
pub fn run_pipeline(steps: &[Transform], input: &str) -> String {
    steps
        .iter()
        .fold(input.to_string(), |acc, step| (step.apply)(&acc).into_owned())
}

/// Sanitizes header text that cannot contain raw HTML.
pub fn parse_header(input: &str) -> String {
    run_pipeline(SHALLOW, input)
}

/// Sanitizes header text that may contain raw HTML tags.
pub fn deeply_parse_header(input: &str) -> String {
    run_pipeline(DEEP, input)
}

static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.[^\]]+)\]\((.[^)]+)\)").expect("valid link regex"));

// Alternation order mirrors a greedy `\*{1,3}` opener: the longest star run
// is tried first at each position.
static EMPHASIS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"`(.*?[^\\])`",
        r"|\*\*\*(.*?[^\\])\*\*\*",
        r"|\*\*(.*?[^\\])\*\*",
        r"|\*(.*?[^\\])\*",
        r"|_(.*?[^\\])_",
    ))
    .expect("valid emphasis regex")
});

static ESCAPED_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([*_`!<$])").expect("valid escape regex"));

static RAW_HTML: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^><`\\])<.*>([^><`\\]|$)").expect("valid html regex"));

/// Decodes `&quot;`, `&#39;`, `&#x3A;`, `&lt;` and `&gt;`.
pub fn unescape_html(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }
    Cow::Owned(
        input
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&#x3A;", ":")
            .replace("&lt;", "<")
            .replace("&gt;", ">"),
    )
}

/// Replaces `[text](url)` with `text`.
pub fn strip_markdown_links(input: &str) -> Cow<'_, str> {
    LINK.replace_all(input, "$1")
}

/// Removes matching `` ` ``, `*`, `**`, `***` and `_` delimiters, keeping the
/// inner text.
pub fn strip_emphasis(input: &str) -> Cow<'_, str> {
    EMPHASIS.replace_all(input, |caps: &Captures<'_>| {
        caps.iter()
            .skip(1)
            .flatten()
            .next()
            .map(|inner| inner.as_str().to_string())
            .unwrap_or_default()
    })
}

/// Drops the backslash in front of `` *_`!<$ ``.
pub fn unescape_punctuation(input: &str) -> Cow<'_, str> {
    ESCAPED_PUNCTUATION.replace_all(input, "$1")
}

/// Trims surrounding whitespace.
pub fn trim(input: &str) -> Cow<'_, str> {
    Cow::Borrowed(input.trim())
}

/// Removes HTML tags whose neighbours are not backticks, angle brackets or
/// backslashes.
///
/// The match is greedy from the first qualifying `<` to the last `>` on the
/// line; the characters just outside the tag survive, so `a <b> c` keeps both
/// spaces.
pub fn strip_raw_html(input: &str) -> Cow<'_, str> {
    RAW_HTML.replace_all(input, "${1}${2}")
}
