#![deny(missing_docs)]
//! Demopress core: compiles markdown documents into page components and page
//! metadata, with dual-variant live demo previews.
//!
//! The pipeline is collaborator-driven: frontmatter extraction, markdown
//! rendering, file stats and script transpiling are all reached through the
//! traits in [`collab`], so the core stays independent of any one markdown
//! engine.

/// Batch compilation across a thread pool.
pub mod batch;
/// LRU cache of compiled documents.
pub mod cache;
/// Component source emission.
pub mod codegen;
/// Collaborator traits and their default implementations.
pub mod collab;
/// The compile pipeline.
pub mod compiler;
/// Compiler configuration.
pub mod config;
/// Live demo preview generation.
pub mod demo;
/// Error types.
pub mod error;
/// Template token escaping for rendered HTML.
pub mod escape;
/// YAML frontmatter extraction.
pub mod frontmatter;
/// Title, description and path derivation.
pub mod metadata;
/// Heading text sanitizers.
pub mod sanitize;
/// Data types shared across the pipeline.
pub mod types;

pub use batch::{BatchInput, BatchOptions, BatchReport, BatchResult, BatchStats};
pub use cache::{CompileCache, DEFAULT_CACHE_CAPACITY};
pub use collab::{
    Collaborators, FileStat, FrontmatterExtractor, FsFileStat, MarkdownRenderer, Transpiler,
};
pub use compiler::DocCompiler;
pub use config::CompilerOptions;
pub use error::{CompileError, SourceLocation};
pub use escape::escape_template_tokens;
pub use frontmatter::{Frontmatter, FrontmatterError, YamlFrontmatter, split_frontmatter};
pub use sanitize::{deeply_parse_header, parse_header};
pub use types::{CompileResult, Header, PageData, RenderData, RenderOutput};
