//! Dual-variant live demo generation.
//!
//! A page whose renderer output carries a demo source is compiled into a
//! preview component that shows the running demo together with two
//! highlighted listings: the original source and a "vanilla" variant whose
//! script has been run through the [`Transpiler`] to drop type syntax.

use crate::codegen::{DemoComponent, demo_component, retarget_template};
use crate::collab::{MarkdownRenderer, Transpiler};
use crate::config::CompilerOptions;
use crate::error::CompileError;
use crate::escape::escape_template_tokens;
use crate::types::Header;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};

static TEMPLATE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<template(?:\s[^>]*)?>.*</template>").expect("valid template regex")
});
static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(<script(?:\s[^>]*)?>)(.*?)</script>").expect("valid script regex")
});
static STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<style(?:\s[^>]*)?>.*</style>").expect("valid style regex")
});
static LANG_TS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\s+lang\s*=\s*["']tsx?["']"#).expect("valid lang regex"));

/// One `<script>…</script>` block of a demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptBlock<'a> {
    /// The whole block, tags included.
    pub block: &'a str,
    /// Opening tag.
    pub open_tag: &'a str,
    /// Text between the tags.
    pub body: &'a str,
}

/// Structural parts of a single-file demo. Each part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoParts<'a> {
    /// `<template>` through the last `</template>`.
    pub template: Option<&'a str>,
    /// Every script block, in source order.
    pub scripts: Vec<ScriptBlock<'a>>,
    /// `<style>` through the last `</style>`.
    pub style: Option<&'a str>,
}

/// Splits a demo source into its template, script and style blocks.
pub fn split_demo(source: &str) -> DemoParts<'_> {
    let scripts = SCRIPT_BLOCK
        .captures_iter(source)
        .filter_map(|caps| {
            Some(ScriptBlock {
                block: caps.get(0)?.as_str(),
                open_tag: caps.get(1)?.as_str(),
                body: caps.get(2)?.as_str(),
            })
        })
        .collect();
    DemoParts {
        template: TEMPLATE_BLOCK.find(source).map(|m| m.as_str()),
        scripts,
        style: STYLE_BLOCK.find(source).map(|m| m.as_str()),
    }
}

/// Wraps `source` in a fenced code block of `lang`.
///
/// The fence is one backtick longer than the longest backtick run inside the
/// source, so embedded fences never close it early.
pub fn fence(lang: &str, source: &str) -> String {
    let longest_run = source
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let ticks = "`".repeat((longest_run + 1).max(3));
    format!(
        "{ticks}{lang}\n{}\n{ticks}",
        source.trim_end_matches(['\r', '\n'])
    )
}

/// Everything the generator reads from the page being compiled.
#[derive(Debug, Clone, Copy)]
pub struct DemoPage<'a> {
    /// Source of the flagged demo block.
    pub demo_source: &'a str,
    /// Full page HTML, already escaped.
    pub page_html: &'a str,
    /// Page headings.
    pub headers: &'a [Header],
    /// Page frontmatter.
    pub frontmatter: &'a Map<String, JsonValue>,
    /// Page path relative to the project root.
    pub relative_path: &'a str,
}

/// Builds demo page components.
pub struct DemoGenerator<'a> {
    renderer: &'a dyn MarkdownRenderer,
    transpiler: &'a dyn Transpiler,
    options: &'a CompilerOptions,
}

impl<'a> DemoGenerator<'a> {
    /// Creates a generator over the given collaborators.
    pub fn new(
        renderer: &'a dyn MarkdownRenderer,
        transpiler: &'a dyn Transpiler,
        options: &'a CompilerOptions,
    ) -> Self {
        Self {
            renderer,
            transpiler,
            options,
        }
    }

    /// Generates the component source for a demo page.
    ///
    /// Missing template, script or style blocks contribute nothing. Render and
    /// transpile failures abort the whole page.
    pub fn generate(&self, page: &DemoPage<'_>) -> Result<String, CompileError> {
        log::debug!("Generating demo preview for {}", page.relative_path);
        let lang = self.options.demo_language.as_str();
        let original_html = self.highlight(lang, page.demo_source)?;

        let parts = split_demo(page.demo_source);
        let vanilla_scripts = self.vanilla_scripts(&parts.scripts)?;
        let vanilla_source = parts
            .template
            .into_iter()
            .chain(vanilla_scripts.iter().map(String::as_str))
            .chain(parts.style)
            .collect::<Vec<_>>()
            .join("\n\n");
        let vanilla_html = self.highlight(lang, &vanilla_source)?;

        let payload = self.payload(page, &vanilla_source)?;
        let template = parts.template.map(retarget_template).unwrap_or_default();
        let scripts: Vec<&str> = parts.scripts.iter().map(|script| script.block).collect();

        Ok(demo_component(&DemoComponent {
            preview_component: &self.options.preview_component,
            payload: &payload,
            template: &template,
            original_html: &original_html,
            vanilla_html: &vanilla_html,
            scripts: &scripts,
            style: parts.style,
        }))
    }

    fn highlight(&self, lang: &str, source: &str) -> Result<String, CompileError> {
        let rendered = self.renderer.render(&fence(lang, source))?;
        Ok(escape_template_tokens(&rendered.html))
    }

    /// Transpiles every script body in order. Scripts with nothing left after
    /// transpiling are dropped.
    fn vanilla_scripts(&self, scripts: &[ScriptBlock<'_>]) -> Result<Vec<String>, CompileError> {
        if scripts.is_empty() {
            log::debug!("Demo has no script block");
        }
        let mut vanilla = Vec::with_capacity(scripts.len());
        for script in scripts {
            let transpiled = self.transpiler.transpile(script.body)?;
            let code = transpiled.trim_matches(['\r', '\n']);
            if code.trim().is_empty() {
                continue;
            }
            let open_tag = LANG_TS.replace_all(script.open_tag, "");
            vanilla.push(format!("{open_tag}\n{code}\n</script>"));
        }
        Ok(vanilla)
    }

    fn payload(&self, page: &DemoPage<'_>, vanilla_source: &str) -> Result<String, CompileError> {
        let mut payload = Map::new();
        for locale in &self.options.caption_locales {
            if let Some(header) = page.headers.iter().find(|h| &h.title == locale) {
                payload.insert(locale.clone(), JsonValue::String(header.content.clone()));
            }
        }

        let marker = self.options.resolved_demo_marker();
        let prefix = match page.page_html.find(&marker) {
            Some(index) => &page.page_html[..index],
            None => {
                log::warn!(
                    "Demo marker {marker:?} not found in {}; embedding full page HTML",
                    page.relative_path
                );
                page.page_html
            }
        };
        payload.insert("html".into(), JsonValue::String(prefix.to_string()));

        for (key, value) in page.frontmatter {
            payload.insert(key.clone(), value.clone());
        }
        payload.insert(
            "relativePath".into(),
            JsonValue::String(page.relative_path.to_string()),
        );
        payload.insert(
            "originalCode".into(),
            JsonValue::String(BASE64.encode(page.demo_source)),
        );
        payload.insert(
            "vanillaCode".into(),
            JsonValue::String(BASE64.encode(vanilla_source)),
        );

        let json = serde_json::to_string(&JsonValue::Object(payload))?;
        Ok(html_escape::encode_quoted_attribute(&json).into_owned())
    }
}
