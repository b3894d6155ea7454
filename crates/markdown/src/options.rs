//! Renderer options and their mapping onto markdown-rs.

use demopress_core::{CompileError, SourceLocation};
use markdown::message::{Message, Place};
use serde::Deserialize;

/// Options for [`MarkdownRsRenderer`](crate::MarkdownRsRenderer).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkdownOptions {
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Parse raw HTML and pass it through to the output.
    pub allow_raw_html: bool,
    /// Enable math constructs (`$inline$` and `$$block$$`).
    pub math: bool,
    /// Word in a fence's meta string that flags it as the page demo.
    pub demo_flag: String,
    /// Fence language a demo block must use.
    pub demo_language: String,
    /// Write heading slugs into `id` attributes of the rendered headings.
    pub heading_anchors: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            allow_raw_html: true,
            math: false,
            demo_flag: "demo".to_string(),
            demo_language: "vue".to_string(),
            heading_anchors: true,
        }
    }
}

impl MarkdownOptions {
    /// markdown-rs parse options. Frontmatter is never parsed here; it is
    /// split off before the body reaches the renderer.
    pub fn to_parse_options(&self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            frontmatter: false,
            html_flow: self.allow_raw_html,
            html_text: self.allow_raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        if self.math {
            constructs.math_flow = true;
            constructs.math_text = true;
        }

        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: self.math,
            ..markdown::ParseOptions::default()
        }
    }

    /// Full markdown-rs options for HTML output.
    pub fn to_markdown(&self) -> markdown::Options {
        markdown::Options {
            parse: self.to_parse_options(),
            compile: markdown::CompileOptions {
                allow_dangerous_html: self.allow_raw_html,
                ..markdown::CompileOptions::gfm()
            },
        }
    }
}

/// Converts a markdown-rs message into a render error with its position.
pub(crate) fn render_error(message: &Message) -> CompileError {
    let location = message_location(message);
    CompileError::render_error(message.to_string(), location.line, location.column)
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::default(),
    }
}
