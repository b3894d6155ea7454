//! The compile pipeline.

use crate::cache::CompileCache;
use crate::codegen::page_component;
use crate::collab::Collaborators;
use crate::config::CompilerOptions;
use crate::demo::{DemoGenerator, DemoPage};
use crate::error::CompileError;
use crate::escape::escape_template_tokens;
use crate::metadata::{escape_content, infer_description, infer_title, relative_path};
use crate::types::{CompileResult, PageData};
use std::path::Path;
use std::sync::Arc;

/// Compiles markdown documents into component source and page data.
///
/// One compiler is built per site build and shared by every document; the
/// cache it holds is the only state that outlives a single compile.
#[derive(Debug, Clone)]
pub struct DocCompiler {
    collaborators: Collaborators,
    cache: Arc<CompileCache>,
    options: CompilerOptions,
}

impl DocCompiler {
    /// Creates a compiler with a fresh cache sized from `options`.
    pub fn new(collaborators: Collaborators, options: CompilerOptions) -> Self {
        let cache = Arc::new(CompileCache::new(options.cache_capacity));
        Self::with_cache(collaborators, cache, options)
    }

    /// Creates a compiler that shares an existing cache.
    pub fn with_cache(
        collaborators: Collaborators,
        cache: Arc<CompileCache>,
        options: CompilerOptions,
    ) -> Self {
        Self {
            collaborators,
            cache,
            options,
        }
    }

    /// The cache backing this compiler.
    pub fn cache(&self) -> &Arc<CompileCache> {
        &self.cache
    }

    /// The options this compiler was built with.
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compiles `source`, read from `file_path`, with paths reported relative
    /// to `project_root`.
    ///
    /// Results are memoized by the exact source text. Any collaborator
    /// failure aborts the compile and nothing is cached.
    pub fn compile(
        &self,
        source: &str,
        file_path: impl AsRef<Path>,
        project_root: impl AsRef<Path>,
    ) -> Result<CompileResult, CompileError> {
        let file_path = file_path.as_ref();
        if let Some(cached) = self.cache.get(source) {
            log::debug!("Cache hit for {}", file_path.display());
            return Ok(cached);
        }
        log::debug!("Cache miss for {}", file_path.display());

        let result = self.compile_uncached(source, file_path, project_root.as_ref())?;
        self.cache.set(source, result.clone());
        Ok(result)
    }

    fn compile_uncached(
        &self,
        source: &str,
        file_path: &Path,
        project_root: &Path,
    ) -> Result<CompileResult, CompileError> {
        let collab = &self.collaborators;
        let frontmatter = collab.frontmatter.extract(source)?;
        let rendered = collab.renderer.render(&frontmatter.body)?;
        let html = escape_template_tokens(&rendered.html);
        let last_updated = collab.file_stat.modified_millis(file_path)?;

        let page_data = PageData {
            title: infer_title(&frontmatter.metadata, &frontmatter.body),
            description: infer_description(&frontmatter.metadata),
            content: escape_content(&frontmatter.body),
            relative_path: relative_path(file_path, project_root),
            headers: rendered.data.headers,
            frontmatter: frontmatter.metadata,
            html,
            last_updated,
        };

        let component_source = match rendered.data.demo_source.as_deref() {
            Some(demo_source) => {
                let generator = DemoGenerator::new(
                    collab.renderer.as_ref(),
                    collab.transpiler.as_ref(),
                    &self.options,
                );
                generator.generate(&DemoPage {
                    demo_source,
                    page_html: &page_data.html,
                    headers: &page_data.headers,
                    frontmatter: &page_data.frontmatter,
                    relative_path: &page_data.relative_path,
                })?
            }
            None => page_component(&page_data.html),
        };

        Ok(CompileResult {
            component_source,
            page_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::FileStat;
    use crate::types::{Header, RenderOutput};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedStat(i64);

    impl FileStat for FixedStat {
        fn modified_millis(&self, _path: &Path) -> Result<i64, CompileError> {
            Ok(self.0)
        }
    }

    fn heading_renderer(text: &str) -> Result<RenderOutput, CompileError> {
        let mut output = RenderOutput::from_html(format!("<p>{}</p>", text.trim()));
        if let Some(title) = text.lines().find_map(|l| l.strip_prefix("# ")) {
            output.data.headers.push(Header::new(1, title));
        }
        Ok(output)
    }

    fn identity(script: &str) -> Result<String, CompileError> {
        Ok(script.to_string())
    }

    fn compiler() -> DocCompiler {
        let collaborators =
            Collaborators::new(heading_renderer, identity).with_file_stat(FixedStat(42));
        DocCompiler::new(collaborators, CompilerOptions::default())
    }

    #[test]
    fn builds_page_data_for_plain_pages() {
        let result = compiler()
            .compile(
                "---\ntitle: Guide\n---\n# Hello {{ name }}",
                "/site/guide/index.md",
                "/site",
            )
            .unwrap();

        let page = &result.page_data;
        assert_eq!(page.title, "Guide");
        assert_eq!(page.description, "");
        assert_eq!(page.relative_path, "guide/index.md");
        assert_eq!(page.last_updated, 42);
        assert_eq!(page.headers, vec![Header::new(1, "Hello {{ name }}")]);
        assert_eq!(page.html, "<p># Hello {<wbr>{ name }<wbr>}</p>");
        assert_eq!(page.content, "# Hello {{ name }}");
        assert_eq!(
            result.component_source,
            "<template><div><p># Hello {<wbr>{ name }<wbr>}</p></div></template>"
        );
    }

    #[test]
    fn page_data_serializes_camel_case() {
        let result = compiler().compile("# T", "/r/a.md", "/r").unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["pageData"]["relativePath"], "a.md");
        assert_eq!(json["pageData"]["lastUpdated"], 42);
        assert!(json["componentSource"].is_string());
    }

    #[test]
    fn second_compile_is_served_from_cache() {
        let renders = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&renders);
        let renderer = move |text: &str| -> Result<RenderOutput, CompileError> {
            counter.fetch_add(1, Ordering::SeqCst);
            heading_renderer(text)
        };
        let compiler = DocCompiler::new(
            Collaborators::new(renderer, identity).with_file_stat(FixedStat(1)),
            CompilerOptions::default(),
        );

        let first = compiler.compile("# Same", "a.md", "").unwrap();
        let second = compiler.compile("# Same", "b.md", "").unwrap();
        assert_eq!(first, second);
        assert_eq!(renders.load(Ordering::SeqCst), 1);

        compiler.compile("# Same ", "a.md", "").unwrap();
        assert_eq!(renders.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_compiles_are_not_cached() {
        struct MissingStat;
        impl FileStat for MissingStat {
            fn modified_millis(&self, path: &Path) -> Result<i64, CompileError> {
                Err(CompileError::missing_file(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                ))
            }
        }

        let cache = Arc::new(CompileCache::default());
        let broken = DocCompiler::with_cache(
            Collaborators::new(heading_renderer, identity).with_file_stat(MissingStat),
            Arc::clone(&cache),
            CompilerOptions::default(),
        );
        let err = broken.compile("# Page", "gone.md", "").unwrap_err();
        assert!(matches!(err, CompileError::MissingFile { .. }));
        assert!(cache.is_empty());

        let fixed = DocCompiler::with_cache(
            Collaborators::new(heading_renderer, identity).with_file_stat(FixedStat(7)),
            Arc::clone(&cache),
            CompilerOptions::default(),
        );
        let result = fixed.compile("# Page", "gone.md", "").unwrap();
        assert_eq!(result.page_data.last_updated, 7);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn frontmatter_errors_propagate() {
        let err = compiler()
            .compile("---\ntitle: [oops\n---\n", "a.md", "")
            .unwrap_err();
        assert!(matches!(err, CompileError::Frontmatter(_)));
    }

    #[test]
    fn cache_capacity_comes_from_options() {
        let options = CompilerOptions {
            cache_capacity: 3,
            ..CompilerOptions::default()
        };
        let compiler = DocCompiler::new(
            Collaborators::new(heading_renderer, identity).with_file_stat(FixedStat(0)),
            options,
        );
        assert_eq!(compiler.cache().capacity(), 3);
    }
}
