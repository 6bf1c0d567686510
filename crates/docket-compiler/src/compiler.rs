//! The document compiler.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use docket_renderer::{BuilderOptions, DocumentBuilder};
use docket_vcs::FileHistory;
use kuchikiki::NodeRef;
use kuchikiki::traits::TendrilSink;

use crate::error::{CompilationError, CompileFailure};
use crate::images::{ImageResolver, ImageUrlPolicy, TemplateImageUrls};
use crate::key::extract_key;
use crate::model::{Category, CompilationParameters, DocumentationPage, PageFields};
use crate::repository::RepositoryMetadataRetriever;
use crate::text::{self, extract_title, validate_title};

/// Pages directory name used when none is configured.
pub const DEFAULT_PAGES_DIR: &str = "Raven.Documentation.Pages";

/// Class attribute given to every image when none is configured.
pub const DEFAULT_IMAGE_CLASS: &str = "img-responsive img-thumbnail";

/// Settings shared by all compilations.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    pub builder: BuilderOptions,
    /// Pages directory inside each version directory.
    pub pages_dir: String,
    pub image_class: String,
    /// Filename suffix of language-specific pages, keyed by language.
    pub file_suffixes: BTreeMap<String, String>,
}

impl CompilerOptions {
    #[must_use]
    pub fn new(docs_root: impl Into<PathBuf>) -> Self {
        Self {
            builder: BuilderOptions::new(docs_root),
            pages_dir: DEFAULT_PAGES_DIR.to_owned(),
            image_class: DEFAULT_IMAGE_CLASS.to_owned(),
            file_suffixes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_pages_dir(mut self, pages_dir: impl Into<String>) -> Self {
        self.pages_dir = pages_dir.into();
        self
    }

    #[must_use]
    pub fn with_image_class(mut self, class: impl Into<String>) -> Self {
        self.image_class = class.into();
        self
    }

    #[must_use]
    pub fn with_file_suffix(mut self, language: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.file_suffixes.insert(language.into(), suffix.into());
        self
    }

    #[must_use]
    pub fn with_samples(
        mut self,
        language: impl Into<String>,
        dir: impl Into<String>,
        fence: impl Into<String>,
    ) -> Self {
        self.builder = self.builder.with_samples(language, dir, fence);
        self
    }

    /// Pages directory of `version`.
    #[must_use]
    pub fn pages_path(&self, version: &str) -> PathBuf {
        self.builder.docs_root.join(version).join(&self.pages_dir)
    }
}

type PageConstructor<P> = Box<dyn Fn(PageFields) -> P + Send + Sync>;

/// Compiles documentation source files into pages.
///
/// `P` is the page type handed back to the caller, built from the compiled
/// [`PageFields`] by the page constructor. A compiler holds no per-call
/// state, so one instance can serve parallel workers.
pub struct DocumentCompiler<P = DocumentationPage> {
    options: CompilerOptions,
    history: Arc<dyn FileHistory>,
    urls: Box<dyn ImageUrlPolicy>,
    make_page: PageConstructor<P>,
}

impl DocumentCompiler {
    /// Compiler producing [`DocumentationPage`]s with template image URLs.
    #[must_use]
    pub fn new(options: CompilerOptions, history: Arc<dyn FileHistory>) -> Self {
        Self {
            options,
            history,
            urls: Box::new(TemplateImageUrls::default()),
            make_page: Box::new(DocumentationPage::from),
        }
    }
}

impl<P> DocumentCompiler<P> {
    #[must_use]
    pub fn with_url_policy(mut self, urls: impl ImageUrlPolicy + 'static) -> Self {
        self.urls = Box::new(urls);
        self
    }

    /// Use `make_page` to turn compiled fields into pages.
    #[must_use]
    pub fn with_page_constructor<Q>(
        self,
        make_page: impl Fn(PageFields) -> Q + Send + Sync + 'static,
    ) -> DocumentCompiler<Q> {
        DocumentCompiler {
            options: self.options,
            history: self.history,
            urls: self.urls,
            make_page: Box::new(make_page),
        }
    }

    #[must_use]
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile one source file.
    pub fn compile(&self, params: CompilationParameters) -> Result<P, CompilationError> {
        let source_path = params.file.path().to_path_buf();
        tracing::debug!(path = %source_path.display(), version = %params.version, "Compiling");
        self.compile_page(params).map_err(|e| e.at(source_path))
    }

    fn compile_page(&self, params: CompilationParameters) -> Result<P, CompileFailure> {
        let CompilationParameters {
            file,
            folder_item,
            version,
            source_version,
            mut mappings,
        } = params;
        let language = folder_item.language;

        let pages_path = self.options.pages_path(version.as_str());
        let suffix = self.options.file_suffixes.get(language.as_str());
        let key = extract_key(file.path(), &pages_path, suffix.map(String::as_str))?;
        let category = Category::from_key(&key);

        let content = file.read().map_err(CompileFailure::Io)?;
        let mut builder = DocumentBuilder::new(
            &self.options.builder,
            file.path(),
            source_version.as_str(),
            content,
        );
        builder.transform_legacy_blocks()?;
        builder.transform_raw_html_blocks()?;
        builder.transform_blocks()?;
        let mut rendered = builder.build(language.as_str());

        let resolver = ImageResolver {
            urls: self.urls.as_ref(),
            class: &self.options.image_class,
            version: &version,
            language: &language,
            key: &key,
            directory: file.directory(),
        };
        let images = resolver.resolve(&mut rendered.html, &rendered.images)?;

        let root = parse_body(&rendered.html);
        let title = extract_title(&root);
        validate_title(&title)?;
        let text = text::extract(&root);
        let html: String = root.children().map(|node| node.to_string()).collect();

        let repository = RepositoryMetadataRetriever::new(self.history.as_ref())
            .get_for_file(file.path())?;

        mappings.sort_by(|a, b| a.version.cmp(&b.version));

        tracing::debug!(key = %key, images = images.len(), "Compiled page");

        Ok((self.make_page)(PageFields {
            key,
            title,
            version,
            html,
            text: text.text,
            language,
            category,
            images,
            last_commit_sha: repository.last_commit_sha,
            relative_path: repository.relative_path,
            mappings,
            metadata: folder_item.metadata,
            seo: folder_item.seo,
            related_articles_html: text.related_articles_html,
            discussion_id: folder_item.discussion_id,
        }))
    }
}

/// Parse an HTML fragment and return its `<body>`.
fn parse_body(html: &str) -> NodeRef {
    let document = kuchikiki::parse_html().one(html);
    document
        .select_first("body")
        .map_or_else(|()| document.clone(), |body| body.as_node().clone())
}
