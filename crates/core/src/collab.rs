//! Capability traits for the collaborators the pipeline calls out to.
//!
//! The compiler only talks to these traits, so tests can swap in
//! deterministic fakes and hosts can plug in their own markdown engine or
//! transpiler.

use crate::error::CompileError;
use crate::frontmatter::{Frontmatter, YamlFrontmatter};
use crate::types::RenderOutput;
use std::path::Path;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

/// Splits a raw document into body and frontmatter metadata.
pub trait FrontmatterExtractor: Send + Sync {
    /// Extracts frontmatter from `source`.
    fn extract(&self, source: &str) -> Result<Frontmatter, CompileError>;
}

/// Renders markdown to HTML plus headings and the flagged demo block.
pub trait MarkdownRenderer: Send + Sync {
    /// Renders `text`.
    fn render(&self, text: &str) -> Result<RenderOutput, CompileError>;
}

/// Reads file modification times.
pub trait FileStat: Send + Sync {
    /// Modification time of `path` in milliseconds since the Unix epoch.
    fn modified_millis(&self, path: &Path) -> Result<i64, CompileError>;
}

/// Strips static type syntax from a script body.
///
/// May return an empty string when nothing but type declarations remain.
pub trait Transpiler: Send + Sync {
    /// Transpiles `script` into its vanilla form.
    fn transpile(&self, script: &str) -> Result<String, CompileError>;
}

impl<F> Transpiler for F
where
    F: Fn(&str) -> Result<String, CompileError> + Send + Sync,
{
    fn transpile(&self, script: &str) -> Result<String, CompileError> {
        (self)(script)
    }
}

impl<F> MarkdownRenderer for F
where
    F: Fn(&str) -> Result<RenderOutput, CompileError> + Send + Sync,
{
    fn render(&self, text: &str) -> Result<RenderOutput, CompileError> {
        (self)(text)
    }
}

/// File-stat collaborator backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileStat;

impl FileStat for FsFileStat {
    fn modified_millis(&self, path: &Path) -> Result<i64, CompileError> {
        let modified = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|err| CompileError::missing_file(path, err))?;
        let millis = match modified.duration_since(UNIX_EPOCH) {
            Ok(since) => i64::try_from(since.as_millis()).unwrap_or(i64::MAX),
            Err(before) => -i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX),
        };
        Ok(millis)
    }
}

/// The set of collaborators one compiler instance uses.
#[derive(Clone)]
pub struct Collaborators {
    /// Frontmatter splitter.
    pub frontmatter: Arc<dyn FrontmatterExtractor>,
    /// Markdown renderer.
    pub renderer: Arc<dyn MarkdownRenderer>,
    /// File modification time source.
    pub file_stat: Arc<dyn FileStat>,
    /// Vanilla-variant transpiler.
    pub transpiler: Arc<dyn Transpiler>,
}

impl Collaborators {
    /// Bundles a renderer and transpiler with the YAML frontmatter extractor
    /// and the filesystem stat.
    pub fn new(
        renderer: impl MarkdownRenderer + 'static,
        transpiler: impl Transpiler + 'static,
    ) -> Self {
        Self {
            frontmatter: Arc::new(YamlFrontmatter),
            renderer: Arc::new(renderer),
            file_stat: Arc::new(FsFileStat),
            transpiler: Arc::new(transpiler),
        }
    }

    /// Replaces the file-stat collaborator.
    pub fn with_file_stat(mut self, file_stat: impl FileStat + 'static) -> Self {
        self.file_stat = Arc::new(file_stat);
        self
    }

    /// Replaces the frontmatter extractor.
    pub fn with_frontmatter(mut self, frontmatter: impl FrontmatterExtractor + 'static) -> Self {
        self.frontmatter = Arc::new(frontmatter);
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
