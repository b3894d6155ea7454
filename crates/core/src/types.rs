//! Data model shared by the pipeline and its collaborators.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Heading metadata reported by the markdown renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Heading depth (1-6).
    pub level: u8,
    /// Visible heading text.
    pub title: String,
    /// Anchor identifier.
    #[serde(default)]
    pub slug: String,
    /// Plain text of the section that follows the heading.
    #[serde(default)]
    pub content: String,
}

impl Header {
    /// Creates a header with an empty slug and section text.
    pub fn new(level: u8, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the section text.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// Structured data the renderer collects next to the HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderData {
    /// Headings in document order.
    pub headers: Vec<Header>,
    /// Source of the fenced block flagged for live preview, if any.
    pub demo_source: Option<String>,
}

/// Output of a single markdown render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Rendered HTML.
    pub html: String,
    /// Headings and demo source.
    pub data: RenderData,
}

impl RenderOutput {
    /// Creates an output with no headers and no demo block.
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            data: RenderData::default(),
        }
    }
}

/// Page metadata handed to the documentation site.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    /// Resolved page title.
    pub title: String,
    /// Description taken from the frontmatter `head` list.
    pub description: String,
    /// Every frontmatter field, untouched.
    pub frontmatter: Map<String, JsonValue>,
    /// Headings in document order.
    pub headers: Vec<Header>,
    /// Source path relative to the project root, `/`-separated.
    pub relative_path: String,
    /// HTML-escaped markdown body.
    pub content: String,
    /// Rendered page HTML with template tokens escaped.
    pub html: String,
    /// Source modification time in milliseconds since the Unix epoch.
    pub last_updated: i64,
}

/// Final output of compiling one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    /// Component source text.
    pub component_source: String,
    /// Page metadata.
    pub page_data: PageData,
}
