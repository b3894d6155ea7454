//! Compiler configuration.

use crate::cache::DEFAULT_CACHE_CAPACITY;
use serde::Deserialize;

const DEFAULT_DEMO_LANGUAGE: &str = "vue";
const DEFAULT_PREVIEW_COMPONENT: &str = "demo-preview";
const DEFAULT_CAPTION_LOCALES: [&str; 2] = ["zh-CN", "en-US"];

/// Options accepted by [`DocCompiler`](crate::DocCompiler).
///
/// Every field is optional when deserializing; missing fields take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Number of compiled documents kept in the cache. Defaults to 1024.
    pub cache_capacity: usize,
    /// Fence language used when re-rendering demo sources. Defaults to `vue`.
    pub demo_language: String,
    /// Tag name of the preview wrapper element. Defaults to `demo-preview`.
    pub preview_component: String,
    /// Header titles whose section text becomes the demo captions.
    pub caption_locales: [String; 2],
    /// Substring of the page HTML where the demo's highlighted code starts.
    /// Defaults to the opening of a code block in the demo language.
    pub demo_marker: Option<String>,
}

impl CompilerOptions {
    /// Marker used to cut the page HTML in front of the demo block.
    pub fn resolved_demo_marker(&self) -> String {
        self.demo_marker
            .clone()
            .unwrap_or_else(|| format!("<pre><code class=\"language-{}\"", self.demo_language))
    }
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            demo_language: DEFAULT_DEMO_LANGUAGE.to_string(),
            preview_component: DEFAULT_PREVIEW_COMPONENT.to_string(),
            caption_locales: DEFAULT_CAPTION_LOCALES.map(str::to_string),
            demo_marker: None,
        }
    }
}
