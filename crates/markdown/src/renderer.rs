//! The default [`MarkdownRenderer`] built on markdown-rs.

use crate::headers::collect;
use crate::options::{MarkdownOptions, render_error};
use demopress_core::{CompileError, MarkdownRenderer, RenderData, RenderOutput};
use lol_html::{RewriteStrSettings, element, rewrite_str};

const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";

/// Renders markdown with markdown-rs, reporting headings and the demo fence.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRsRenderer {
    options: MarkdownOptions,
}

impl MarkdownRsRenderer {
    /// Creates a renderer with the given options.
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    /// The options this renderer was built with.
    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }
}

impl MarkdownRenderer for MarkdownRsRenderer {
    fn render(&self, text: &str) -> Result<RenderOutput, CompileError> {
        let markdown_options = self.options.to_markdown();
        let root =
            markdown::to_mdast(text, &markdown_options.parse).map_err(|e| render_error(&e))?;
        let html = markdown::to_html_with_options(text, &markdown_options)
            .map_err(|e| render_error(&e))?;

        let collected = collect(&root, &self.options);
        if collected.demo_source.is_some() {
            log::debug!(
                "Found `{} {}` demo fence",
                self.options.demo_language,
                self.options.demo_flag
            );
        }
        let html = if self.options.heading_anchors && !collected.headers.is_empty() {
            inject_heading_ids(&html, &collected.anchors)?
        } else {
            html
        };

        Ok(RenderOutput {
            html,
            data: RenderData {
                headers: collected.headers,
                demo_source: collected.demo_source,
            },
        })
    }
}

/// Writes header slugs into the `id` of the rendered headings, in order.
///
/// Headings that already carry an id are left alone and take no entry.
/// A `None` entry marks a raw HTML heading, which keeps its markup as is.
fn inject_heading_ids(html: &str, anchors: &[Option<String>]) -> Result<String, CompileError> {
    let mut anchors = anchors.iter();
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(HEADING_SELECTOR, |el| {
                if el.has_attribute("id") {
                    return Ok(());
                }
                if let Some(Some(slug)) = anchors.next() {
                    el.set_attribute("id", slug)?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| CompileError::render_error(err.to_string(), 1, 1))
}
