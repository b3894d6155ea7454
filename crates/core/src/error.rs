use crate::frontmatter::FrontmatterError;
use std::path::PathBuf;
use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that abort the compilation of a single document.
///
/// Every variant is fatal for the document being compiled; the pipeline never
/// turns one of these into degraded output and never caches a failed compile.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The file-stat collaborator could not read the source file.
    #[error("Cannot stat {}: {source}", path.display())]
    MissingFile {
        /// Path that was queried.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Frontmatter block could not be split or parsed.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    /// The markdown renderer rejected its input.
    #[error("Render error at {location}: {message}")]
    Render {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// The vanilla-variant transpiler failed.
    #[error("Transpile error: {message}")]
    Transpile {
        /// Error message
        message: String,
    },
    /// The demo preview payload could not be serialized.
    #[error("Payload serialization error: {0}")]
    Payload(#[from] serde_json::Error),
}

impl CompileError {
    /// Create a missing-file error for `path`.
    pub fn missing_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::MissingFile {
            path: path.into(),
            source,
        }
    }

    /// Create a render error with location
    pub fn render_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Render {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }

    /// Create a transpile error
    pub fn transpile_error(message: impl Into<String>) -> Self {
        Self::Transpile {
            message: message.into(),
        }
    }
}
