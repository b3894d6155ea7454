//! Heading and demo-block collection over the mdast.

use crate::options::MarkdownOptions;
use crate::slug::{Slugger, extract_custom_id};
use demopress_core::Header;
use markdown::mdast::{Code, Heading, Node};
use once_cell::sync::Lazy;
use regex::Regex;

static RAW_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<h[1-6](\s[^>]*)?/?>").expect("valid raw heading regex")
});
static ID_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(^|\s)id\s*=").expect("valid id attribute regex"));

/// Everything the renderer reads out of the tree besides the HTML.
#[derive(Debug, Default)]
pub struct Collected {
    /// Headings in document order, with unique slugs and section text.
    pub headers: Vec<Header>,
    /// Value of the first flagged demo fence.
    pub demo_source: Option<String>,
    /// One entry per id-less heading element of the rendered HTML, in order:
    /// the slug of a markdown heading, or `None` for a raw HTML heading.
    pub anchors: Vec<Option<String>>,
}

/// Walks the document for headings and the demo block.
///
/// Headings nested in containers such as blockquotes and list items are
/// collected too. Paragraph text belongs to the section of the closest
/// preceding heading.
pub fn collect(root: &Node, options: &MarkdownOptions) -> Collected {
    let mut walker = Walker::default();
    if let Some(children) = root.children() {
        walker.walk(children);
    }

    let Walker {
        mut headers,
        sections,
        anchors,
        ..
    } = walker;
    for (header, section) in headers.iter_mut().zip(sections) {
        header.content = section.join("\n");
    }
    Collected {
        headers,
        demo_source: find_demo(root, options).map(|code| code.value.clone()),
        anchors,
    }
}

#[derive(Default)]
struct Walker {
    slugger: Slugger,
    headers: Vec<Header>,
    sections: Vec<Vec<String>>,
    anchors: Vec<Option<String>>,
}

impl Walker {
    fn walk(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Heading(heading) => self.heading(heading),
                Node::Html(html) => self.raw_html(&html.value),
                Node::Code(_) => {}
                other => match other.children() {
                    Some(children) if holds_headings(other) => self.walk(children),
                    _ => {
                        self.section_text(other);
                        self.raw_html_within(other);
                    }
                },
            }
        }
    }

    fn heading(&mut self, heading: &Heading) {
        let text = plain_text(&heading.children);
        let (title, custom_id) = extract_custom_id(&text);
        let slug = match custom_id {
            Some(id) => self.slugger.claim(id.to_string()),
            None => self.slugger.next_slug(title),
        };
        self.anchors.push(Some(slug.clone()));
        self.headers.push(Header {
            level: heading.depth,
            title: title.to_string(),
            slug,
            content: String::new(),
        });
        self.sections.push(Vec::new());
        for child in &heading.children {
            self.raw_html_within(child);
        }
    }

    /// Raw heading tags without an id get a placeholder so they do not take a slug.
    fn raw_html(&mut self, html: &str) {
        for tag in RAW_HEADING.captures_iter(html) {
            let has_id = tag
                .get(1)
                .is_some_and(|attributes| ID_ATTRIBUTE.is_match(attributes.as_str()));
            if !has_id {
                self.anchors.push(None);
            }
        }
    }

    fn raw_html_within(&mut self, node: &Node) {
        match node {
            Node::Html(html) => self.raw_html(&html.value),
            other => {
                for child in other.children().into_iter().flatten() {
                    self.raw_html_within(child);
                }
            }
        }
    }

    fn section_text(&mut self, node: &Node) {
        let Some(section) = self.sections.last_mut() else {
            return;
        };
        let text = block_text(node);
        if !text.is_empty() {
            section.push(text);
        }
    }
}

/// Whether a container has a heading or block-level raw HTML somewhere below it.
fn holds_headings(node: &Node) -> bool {
    !matches!(node, Node::Paragraph(_))
        && node.children().is_some_and(|children| {
            children.iter().any(|child| {
                matches!(child, Node::Heading(_) | Node::Html(_)) || holds_headings(child)
            })
        })
}

/// First fenced block in the demo language whose meta carries the demo flag.
pub fn find_demo<'a>(node: &'a Node, options: &MarkdownOptions) -> Option<&'a Code> {
    if let Node::Code(code) = node {
        if is_demo_fence(code, options) {
            return Some(code);
        }
    }
    node.children()?
        .iter()
        .find_map(|child| find_demo(child, options))
}

fn is_demo_fence(code: &Code, options: &MarkdownOptions) -> bool {
    code.lang.as_deref() == Some(options.demo_language.as_str())
        && code
            .meta
            .as_deref()
            .is_some_and(|meta| meta.split_whitespace().any(|word| word == options.demo_flag))
}

fn block_text(node: &Node) -> String {
    let text = match node.children() {
        Some(children) if matches!(node, Node::Paragraph(_)) => plain_text(children),
        Some(children) => children
            .iter()
            .filter(|child| !matches!(child, Node::Code(_) | Node::Html(_)))
            .map(block_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        None => plain_text(std::slice::from_ref(node)),
    };
    text.trim().to_string()
}

/// Concatenated literal text of inline nodes, raw HTML excluded.
pub fn plain_text(nodes: &[Node]) -> String {
    let mut text = String::new();
    push_text(nodes, &mut text);
    text.trim().to_string()
}

fn push_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(&t.value),
            Node::InlineCode(c) => out.push_str(&c.value),
            Node::InlineMath(m) => out.push_str(&m.value),
            Node::Break(_) => out.push(' '),
            Node::Html(_) => {}
            other => {
                if let Some(children) = other.children() {
                    push_text(children, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Node {
        markdown::to_mdast(source, &MarkdownOptions::default().to_parse_options())
            .expect("markdown parses")
    }

    #[test]
    fn collects_headings_with_unique_slugs() {
        let root = parse("# Intro\n\n## Usage\n\n## Usage\n\n### Setup {#install}\n");
        let collected = collect(&root, &MarkdownOptions::default());
        let summary: Vec<_> = collected
            .headers
            .iter()
            .map(|h| (h.level, h.title.as_str(), h.slug.as_str()))
            .collect();
        assert_eq!(
            summary,
            [
                (1, "Intro", "intro"),
                (2, "Usage", "usage"),
                (2, "Usage", "usage-1"),
                (3, "Setup", "install"),
            ]
        );
    }

    #[test]
    fn heading_titles_drop_markup() {
        let root = parse("## The `button` **API** <Badge text=\"new\"/>\n");
        let collected = collect(&root, &MarkdownOptions::default());
        assert_eq!(collected.headers[0].title, "The button API");
    }

    #[test]
    fn section_text_runs_until_next_heading() {
        let root = parse(
            "## zh-CN\n\n按钮用于开始一个即时操作。\n\n## en-US\n\nA *button* starts an action.\n\nSecond line.\n\n```vue demo\n<template/>\n```\n\n## API\n",
        );
        let collected = collect(&root, &MarkdownOptions::default());
        assert_eq!(collected.headers[0].content, "按钮用于开始一个即时操作。");
        assert_eq!(
            collected.headers[1].content,
            "A button starts an action.\nSecond line."
        );
        assert_eq!(collected.headers[2].content, "");
    }

    #[test]
    fn nested_headings_are_collected_in_document_order() {
        let root = parse("> # Quoted\n>\n> inside\n\n- ## Listed\n\n# Real\n\nafter\n");
        let collected = collect(&root, &MarkdownOptions::default());
        let summary: Vec<_> = collected
            .headers
            .iter()
            .map(|h| (h.slug.as_str(), h.content.as_str()))
            .collect();
        assert_eq!(
            summary,
            [("quoted", "inside"), ("listed", ""), ("real", "after")]
        );
        assert_eq!(
            collected.anchors,
            [
                Some("quoted".to_string()),
                Some("listed".to_string()),
                Some("real".to_string()),
            ]
        );
    }

    #[test]
    fn raw_html_headings_hold_a_place_without_a_slug() {
        let root = parse(
            "<h2>Raw</h2>\n\n## Real\n\n<div>\n<h3 id=\"kept\">Kept</h3>\n<h4 class=\"x\">Bare</h4>\n</div>\n",
        );
        let collected = collect(&root, &MarkdownOptions::default());
        assert_eq!(collected.headers.len(), 1);
        assert_eq!(collected.anchors, [None, Some("real".to_string()), None]);
    }

    #[test]
    fn raw_html_is_inert_when_disabled() {
        let options = MarkdownOptions {
            allow_raw_html: false,
            ..MarkdownOptions::default()
        };
        let root = markdown::to_mdast("<h2>Raw</h2>\n\n## Real\n", &options.to_parse_options())
            .expect("markdown parses");
        assert_eq!(collect(&root, &options).anchors, [Some("real".to_string())]);
    }

    #[test]
    fn finds_first_flagged_demo_fence() {
        let root = parse(
            "```vue\nplain\n```\n\n```js demo\nwrong lang\n```\n\n```vue demo\nfirst\n```\n\n```vue demo\nsecond\n```\n",
        );
        let collected = collect(&root, &MarkdownOptions::default());
        assert_eq!(collected.demo_source.as_deref(), Some("first"));
    }

    #[test]
    fn demo_flag_must_be_a_whole_word() {
        let root = parse("```vue demonstration\nx\n```\n");
        assert!(collect(&root, &MarkdownOptions::default()).demo_source.is_none());

        let root = parse("```vue title=\"x\" demo\ny\n```\n");
        assert_eq!(
            collect(&root, &MarkdownOptions::default()).demo_source.as_deref(),
            Some("y")
        );
    }

    #[test]
    fn demo_inside_containers_is_found() {
        let root = parse("> ```vue demo\n> nested\n> ```\n");
        assert_eq!(
            collect(&root, &MarkdownOptions::default()).demo_source.as_deref(),
            Some("nested")
        );
    }
}
