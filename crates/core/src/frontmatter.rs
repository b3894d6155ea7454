use crate::collab::FrontmatterExtractor;
use crate::error::CompileError;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// A document split into its frontmatter metadata and markdown body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    /// Markdown that follows the frontmatter block.
    pub body: String,
    /// Parsed frontmatter mapping (empty when the document has none).
    pub metadata: Map<String, JsonValue>,
}

/// Errors emitted while parsing or extracting frontmatter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Unclosed YAML fence (e.g., missing terminating `---`).
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Default extractor for `---` fenced YAML frontmatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFrontmatter;

impl FrontmatterExtractor for YamlFrontmatter {
    fn extract(&self, source: &str) -> Result<Frontmatter, CompileError> {
        Ok(split_frontmatter(source)?)
    }
}

/// Splits `input` into YAML frontmatter metadata and the remaining body.
pub fn split_frontmatter(input: &str) -> Result<Frontmatter, FrontmatterError> {
    match find_yaml_block(input)? {
        Some((block, body_start)) => Ok(Frontmatter {
            body: input[body_start..].to_string(),
            metadata: parse_yaml_block(block)?,
        }),
        None => Ok(Frontmatter {
            body: input.strip_prefix('\u{feff}').unwrap_or(input).to_string(),
            metadata: Map::new(),
        }),
    }
}

fn parse_yaml_block(block: &str) -> Result<Map<String, JsonValue>, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Map::new());
    }

    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match json_value {
        JsonValue::Null => Ok(Map::new()),
        JsonValue::Object(map) => Ok(map),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

/// Locates the fenced block; returns the YAML text and the byte offset where
/// the body begins in `input`.
fn find_yaml_block(input: &str) -> Result<Option<(&str, usize)>, FrontmatterError> {
    let bom_len = if input.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };
    let text = &input[bom_len..];

    let mut lines = LineCursor::new(text);
    let Some((first, block_start)) = lines.next() else {
        return Ok(None);
    };
    if !is_yaml_fence(first) {
        return Ok(None);
    }

    let mut block_end = block_start;
    for (line, next_cursor) in lines {
        if is_yaml_fence(line) {
            let block = text[block_start..block_end].trim_end_matches(['\r', '\n']);
            return Ok(Some((block, bom_len + next_cursor)));
        }
        block_end = next_cursor;
    }
    Err(FrontmatterError::Unterminated)
}

/// Iterates lines together with the byte offset just past each line break.
struct LineCursor<'a> {
    input: &'a str,
    cursor: usize,
}

impl<'a> LineCursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, cursor: 0 }
    }
}

impl<'a> Iterator for LineCursor<'a> {
    type Item = (&'a str, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.input.len() {
            return None;
        }
        let start = self.cursor;
        let rest = &self.input[start..];
        let (line, next) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], start + pos + 1),
            None => (rest, self.input.len()),
        };
        self.cursor = next;
        Some((line, next))
    }
}

fn is_yaml_fence(line: &str) -> bool {
    line.trim_end_matches('\r').trim_end() == "---"
}
