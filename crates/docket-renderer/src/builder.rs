//! Document builder: the rewrite passes and the final render.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::callout::{CALLOUT_KINDS, CalloutDirective};
use crate::directive::{DirectiveProcessor, DirectiveProcessorConfig};
use crate::language::{LanguageDirective, filter_languages};
use crate::legacy::{LegacyError, normalize_legacy};
use crate::raw_html::{RawHtmlBlocks, UnclosedRawHtml};
use crate::renderer::{HtmlRenderer, RenderResult};
use crate::samples::{CodeSampleDirective, SampleLanguage};

/// Settings shared by every document of a build.
#[derive(Debug, Clone, Default)]
pub struct BuilderOptions {
    /// Directory holding the per-version directories.
    pub docs_root: PathBuf,
    /// Code sample locations keyed by language name.
    pub samples: BTreeMap<String, SampleLanguage>,
}

impl BuilderOptions {
    #[must_use]
    pub fn new(docs_root: impl Into<PathBuf>) -> Self {
        Self {
            docs_root: docs_root.into(),
            samples: BTreeMap::new(),
        }
    }

    /// Register where the samples of `language` live.
    #[must_use]
    pub fn with_samples(
        mut self,
        language: impl Into<String>,
        dir: impl Into<String>,
        fence: impl Into<String>,
    ) -> Self {
        self.samples.insert(
            language.into(),
            SampleLanguage {
                dir: dir.into(),
                fence: fence.into(),
            },
        );
        self
    }
}

/// A document could not be built.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid legacy block in {}", path.display())]
    Legacy {
        path: PathBuf,
        #[source]
        source: LegacyError,
    },
    #[error("invalid raw HTML block in {}", path.display())]
    RawHtml {
        path: PathBuf,
        #[source]
        source: UnclosedRawHtml,
    },
    #[error("directive errors in {}: {}", path.display(), warnings.join("; "))]
    Directives { path: PathBuf, warnings: Vec<String> },
}

/// Builds one document.
///
/// The passes run in a fixed order: [`transform_legacy_blocks`],
/// [`transform_raw_html_blocks`], [`transform_blocks`], then [`build`].
///
/// ```
/// use docket_renderer::{BuilderOptions, DocumentBuilder};
///
/// let options = BuilderOptions::new("Documentation");
/// let mut builder = DocumentBuilder::new(
///     &options,
///     "Documentation/5.1/Raven.Documentation.Pages/start.markdown",
///     "5.1",
///     "# Start\n\n{NOTE: Tip}\nRead *this*.\n{NOTE/}\n",
/// );
/// builder.transform_legacy_blocks()?;
/// builder.transform_raw_html_blocks()?;
/// builder.transform_blocks()?;
/// let result = builder.build("csharp");
/// assert!(result.html.contains(r#"<div class="callout callout-note">"#));
/// # Ok::<(), docket_renderer::BuildError>(())
/// ```
///
/// [`transform_legacy_blocks`]: Self::transform_legacy_blocks
/// [`transform_raw_html_blocks`]: Self::transform_raw_html_blocks
/// [`transform_blocks`]: Self::transform_blocks
/// [`build`]: Self::build
pub struct DocumentBuilder<'a> {
    options: &'a BuilderOptions,
    path: PathBuf,
    source_version: String,
    content: String,
    raw_html: RawHtmlBlocks,
}

impl<'a> DocumentBuilder<'a> {
    #[must_use]
    pub fn new(
        options: &'a BuilderOptions,
        path: impl Into<PathBuf>,
        source_version: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            options,
            path: path.into(),
            source_version: source_version.into(),
            content: content.into(),
            raw_html: RawHtmlBlocks::default(),
        }
    }

    /// Path of the document being built.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current markdown text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Rewrite the legacy brace syntax into directives.
    pub fn transform_legacy_blocks(&mut self) -> Result<(), BuildError> {
        self.content =
            normalize_legacy(&self.content, &self.source_version).map_err(|source| {
                BuildError::Legacy {
                    path: self.path.clone(),
                    source,
                }
            })?;
        Ok(())
    }

    /// Set `{HTML}` regions aside so the renderer never sees them.
    pub fn transform_raw_html_blocks(&mut self) -> Result<(), BuildError> {
        self.content = self
            .raw_html
            .extract(&self.content)
            .map_err(|source| BuildError::RawHtml {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }

    /// Resolve directives; any problem fails the document.
    pub fn transform_blocks(&mut self) -> Result<(), BuildError> {
        let config = DirectiveProcessorConfig::new()
            .with_base_dir(&self.options.docs_root)
            .with_source_path(&self.path);
        let processor = DirectiveProcessor::with_config(config)
            .with_leaf(CodeSampleDirective::new(
                self.options.samples.clone(),
                self.source_version.clone(),
            ))
            .with_container(LanguageDirective::default());
        let mut processor = CALLOUT_KINDS
            .into_iter()
            .fold(processor, |p, kind| p.with_container(CalloutDirective::new(kind)));

        let content = processor.process(&self.content);
        let warnings = processor.warnings();
        if !warnings.is_empty() {
            return Err(BuildError::Directives {
                path: self.path.clone(),
                warnings,
            });
        }
        self.content = content;
        Ok(())
    }

    /// Render the page as seen by readers of `language`.
    #[must_use]
    pub fn build(self, language: &str) -> RenderResult {
        let markdown = filter_languages(&self.content, language);
        let mut result = HtmlRenderer::new().render_markdown(&markdown);
        self.raw_html.restore(&mut result.html);
        tracing::trace!(
            path = %self.path.display(),
            images = result.images.len(),
            "Rendered document"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use pretty_assertions::assert_eq;

    fn build(options: &BuilderOptions, content: &str, language: &str) -> Result<RenderResult, BuildError> {
        let mut builder = DocumentBuilder::new(options, "page.markdown", "5.1", content);
        builder.transform_legacy_blocks()?;
        builder.transform_raw_html_blocks()?;
        builder.transform_blocks()?;
        Ok(builder.build(language))
    }

    fn docs_root() -> (tempfile::TempDir, BuilderOptions) {
        let temp_dir = tempfile::tempdir().unwrap();
        let samples = temp_dir.path().join("5.1/Samples/csharp/Indexes");
        fs::create_dir_all(&samples).unwrap();
        fs::write(
            samples.join("Orders.cs"),
            "class Orders\n{\n    #region query\n    var q = a < b;\n    #endregion\n}\n",
        )
        .unwrap();
        let options = BuilderOptions::new(temp_dir.path()).with_samples(
            "csharp",
            "Samples/csharp",
            "csharp",
        );
        (temp_dir, options)
    }

    #[test]
    fn test_legacy_code_reference_is_inlined() {
        let (_root, options) = docs_root();
        let result = build(
            &options,
            "# Query\n\n{CODE:csharp query@Indexes\\Orders.cs /}\n",
            "csharp",
        )
        .unwrap();
        assert_eq!(
            result.html,
            "<h1 id=\"query\">Query</h1>\n\
             <pre><code class=\"language-csharp\">var q = a &lt; b;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_raw_html_survives_rendering() {
        let (_root, options) = docs_root();
        let result = build(
            &options,
            "Text\n{HTML}\n<span>*not emphasis*</span>\n{HTML/}\n",
            "csharp",
        )
        .unwrap();
        assert_eq!(
            result.html,
            "<p>Text</p>\n<span>*not emphasis*</span>\n"
        );
    }

    #[test]
    fn test_language_sections() {
        let (_root, options) = docs_root();
        let content = ":::language[csharp]\nC#\n:::\n:::language[java]\nJava\n:::\n";
        assert_eq!(build(&options, content, "java").unwrap().html, "<p>Java</p>\n");
    }

    #[test]
    fn test_images_are_reported() {
        let (_root, options) = docs_root();
        let result = build(&options, "![Studio](images/studio.png)", "csharp").unwrap();
        assert_eq!(result.images.len(), 1);
        assert_eq!(result.images[0].src, "images/studio.png");
    }

    #[test]
    fn test_legacy_error_names_file() {
        let (_root, options) = docs_root();
        let err = build(&options, "{NOTE}\nunterminated", "csharp").unwrap_err();
        assert_eq!(err.to_string(), "invalid legacy block in page.markdown");
        let BuildError::Legacy { source, .. } = err else {
            panic!("expected legacy error");
        };
        assert_eq!(source.line, 1);
    }

    #[test]
    fn test_unclosed_raw_html() {
        let (_root, options) = docs_root();
        let err = build(&options, "{HTML}\n<div>", "csharp").unwrap_err();
        assert!(matches!(err, BuildError::RawHtml { .. }));
    }

    #[test]
    fn test_missing_sample_region_fails() {
        let (_root, options) = docs_root();
        let err = build(
            &options,
            r#"::code[nope]{lang="csharp" file="Indexes/Orders.cs"}"#,
            "csharp",
        )
        .unwrap_err();
        let BuildError::Directives { warnings, .. } = err else {
            panic!("expected directive error");
        };
        assert_eq!(
            warnings,
            vec!["page.markdown:1: 5.1/Samples/csharp/Indexes/Orders.cs: region 'nope' not found"]
        );
    }

    #[test]
    fn test_unclosed_container_fails() {
        let (_root, options) = docs_root();
        let err = build(&options, ":::warning\ntext", "csharp").unwrap_err();
        assert!(err.to_string().contains("unclosed container directive :::warning"));
    }
}
