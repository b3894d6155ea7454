//! Component source emission.

use std::fmt::Write as FmtWrite;

/// Slot receiving the highlighted original-dialect source.
pub const ORIGINAL_CODE_SLOT: &str = "original-code";
/// Slot receiving the highlighted vanilla source.
pub const VANILLA_CODE_SLOT: &str = "vanilla-code";

/// Wraps already-escaped page HTML into a single-root component.
pub fn page_component(html: &str) -> String {
    format!("<template><div>{html}</div></template>")
}

/// Pieces of a demo page component.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoComponent<'a> {
    /// Wrapper element tag name.
    pub preview_component: &'a str,
    /// Attribute-escaped JSON payload.
    pub payload: &'a str,
    /// Demo template block, retargeted at the default slot.
    pub template: &'a str,
    /// Escaped, highlighted original source.
    pub original_html: &'a str,
    /// Escaped, highlighted vanilla source.
    pub vanilla_html: &'a str,
    /// Original script blocks in source order, copied verbatim.
    pub scripts: &'a [&'a str],
    /// Original style block, copied verbatim.
    pub style: Option<&'a str>,
}

/// Emits the demo page component: the preview wrapper with its three slots,
/// followed by the demo's own script and style blocks.
pub fn demo_component(parts: &DemoComponent<'_>) -> String {
    let mut code = String::new();
    let _ = writeln!(code, "<template>");
    let _ = writeln!(
        code,
        "<{} data=\"{}\">",
        parts.preview_component, parts.payload
    );
    if !parts.template.is_empty() {
        let _ = writeln!(code, "{}", parts.template);
    }
    emit_named_slot(&mut code, ORIGINAL_CODE_SLOT, parts.original_html);
    emit_named_slot(&mut code, VANILLA_CODE_SLOT, parts.vanilla_html);
    let _ = writeln!(code, "</{}>", parts.preview_component);
    let _ = writeln!(code, "</template>");
    for block in parts.scripts.iter().copied().chain(parts.style) {
        let _ = writeln!(code, "{block}");
    }
    code
}

/// Rewrites the outermost `<template` tag of a demo so its content lands in
/// the wrapper's default slot.
pub fn retarget_template(template: &str) -> String {
    match template.strip_prefix("<template") {
        Some(rest) => format!("<template #default{rest}"),
        None => template.to_string(),
    }
}

fn emit_named_slot(code: &mut String, slot_name: &str, html: &str) {
    let _ = writeln!(code, "<template #{slot_name}>{html}</template>");
}
