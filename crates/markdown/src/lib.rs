#![deny(missing_docs)]
//! Default markdown renderer for demopress, built on markdown-rs.
//!
//! [`MarkdownRsRenderer`] turns a document body into HTML with slugged
//! heading anchors, the header list with section text, and the source of
//! the first fence flagged as a live demo.

/// Heading and demo-block collection.
pub mod headers;
/// Renderer options.
pub mod options;
/// The markdown-rs renderer.
pub mod renderer;
/// Heading slug generation.
pub mod slug;

pub use options::MarkdownOptions;
pub use renderer::MarkdownRsRenderer;
pub use slug::{Slugger, extract_custom_id, slugify};
