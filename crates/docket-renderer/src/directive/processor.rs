//! Directive processor: rewrites directive lines before markdown rendering.

use std::io;
use std::path::{Path, PathBuf};

use crate::fence::FenceTracker;

use super::parser::{ParsedDirective, parse_block_line};
use super::{ContainerDirective, DirectiveContext, DirectiveOutput, LeafDirective};

/// Type alias for the file reading callback function.
pub type ReadFileFn = dyn Fn(&Path) -> io::Result<String> + Send;

/// Configuration for the directive processor.
pub struct DirectiveProcessorConfig {
    /// Base directory for resolving relative paths.
    pub base_dir: PathBuf,
    /// Path to the source file being processed (if known).
    pub source_path: Option<PathBuf>,
    /// Callback to read files.
    ///
    /// Default: `std::fs::read_to_string`
    pub read_file: Option<Box<ReadFileFn>>,
    /// Maximum nesting of markdown produced by directives.
    ///
    /// Default: 10
    pub max_include_depth: usize,
}

impl Default for DirectiveProcessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectiveProcessorConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            source_path: None,
            read_file: None,
            max_include_depth: 10,
        }
    }

    /// Set the base directory for resolving relative paths.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Set the source file path.
    #[must_use]
    pub fn with_source_path(mut self, source_path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(source_path.into());
        self
    }

    /// Set the file reading callback.
    #[must_use]
    pub fn with_read_file<F>(mut self, read_file: F) -> Self
    where
        F: Fn(&Path) -> io::Result<String> + Send + 'static,
    {
        self.read_file = Some(Box::new(read_file));
        self
    }

    /// Set the maximum include depth.
    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    fn create_context(&self, line: usize) -> DirectiveContext<'_> {
        DirectiveContext {
            source_path: self.source_path.as_deref(),
            base_dir: &self.base_dir,
            line,
            read_file: self.read_file.as_ref().map_or_else(
                || &default_read_file as &dyn Fn(&Path) -> io::Result<String>,
                |f| f.as_ref(),
            ),
        }
    }
}

fn default_read_file(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// A container whose closing `:::` has not been seen yet.
struct OpenContainer {
    name: String,
    /// Handler index; `None` keeps the closing line as written.
    handler: Option<usize>,
    /// Where the container was opened.
    location: String,
}

/// Processor for block directives.
///
/// Lines inside fenced code blocks are never interpreted. Directives without
/// a registered handler are left exactly as written.
///
/// ```
/// use docket_renderer::directive::{
///     ContainerDirective, DirectiveArgs, DirectiveContext, DirectiveOutput, DirectiveProcessor,
/// };
///
/// struct Aside;
///
/// impl ContainerDirective for Aside {
///     fn name(&self) -> &str { "aside" }
///     fn start(&mut self, _args: DirectiveArgs, _ctx: &DirectiveContext) -> DirectiveOutput {
///         DirectiveOutput::html("<aside>")
///     }
///     fn end(&mut self, _line: usize) -> Option<String> {
///         Some("</aside>".to_owned())
///     }
/// }
///
/// let mut processor = DirectiveProcessor::new().with_container(Aside);
/// let output = processor.process(":::aside\nText\n:::");
/// assert_eq!(output, "<aside>\nText\n</aside>");
/// ```
pub struct DirectiveProcessor {
    config: DirectiveProcessorConfig,
    leaf_handlers: Vec<Box<dyn LeafDirective>>,
    container_handlers: Vec<Box<dyn ContainerDirective>>,
    fence: FenceTracker,
    /// Open containers, innermost last.
    open: Vec<OpenContainer>,
    warnings: Vec<String>,
}

impl Default for DirectiveProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectiveProcessor {
    /// Create a new directive processor with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DirectiveProcessorConfig::default())
    }

    /// Create a new directive processor with custom configuration.
    #[must_use]
    pub fn with_config(config: DirectiveProcessorConfig) -> Self {
        Self {
            config,
            leaf_handlers: Vec::new(),
            container_handlers: Vec::new(),
            fence: FenceTracker::new(),
            open: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Register a leaf directive handler.
    #[must_use]
    pub fn with_leaf<D: LeafDirective + 'static>(mut self, handler: D) -> Self {
        self.leaf_handlers.push(Box::new(handler));
        self
    }

    /// Register a container directive handler.
    #[must_use]
    pub fn with_container<D: ContainerDirective + 'static>(mut self, handler: D) -> Self {
        self.container_handlers.push(Box::new(handler));
        self
    }

    /// Rewrite every directive line in `input`.
    ///
    /// Markdown returned by a handler is processed again, up to
    /// `max_include_depth` levels.
    #[must_use]
    pub fn process(&mut self, input: &str) -> String {
        let output = self.process_with_depth(input, 0);
        self.finalize();
        output
    }

    fn process_with_depth(&mut self, input: &str, depth: usize) -> String {
        if depth > self.config.max_include_depth {
            self.warnings.push(format!(
                "Maximum include depth ({}) exceeded",
                self.config.max_include_depth
            ));
            return input.to_owned();
        }

        let mut output = String::with_capacity(input.len());
        let lines: Vec<&str> = input.lines().collect();
        let line_count = lines.len();

        for (idx, line) in lines.iter().enumerate() {
            let processed = self.process_line(line, idx + 1, depth);
            output.push_str(&processed);

            // Preserve line endings
            if idx < line_count - 1 || input.ends_with('\n') {
                output.push('\n');
            }
        }

        output
    }

    fn process_line(&mut self, line: &str, line_num: usize, depth: usize) -> String {
        self.fence.update(line);
        if self.fence.in_fence() {
            return line.to_owned();
        }

        match parse_block_line(line) {
            Some(ParsedDirective::Leaf { name, args }) => {
                let Some(idx) = self.leaf_handlers.iter().position(|h| h.name() == name) else {
                    return line.to_owned();
                };
                let ctx = self.config.create_context(line_num);
                match self.leaf_handlers[idx].process(args, &ctx) {
                    DirectiveOutput::Html(html) => html,
                    DirectiveOutput::Markdown(md) => self.process_with_depth(&md, depth + 1),
                    DirectiveOutput::Skip => line.to_owned(),
                }
            }
            Some(ParsedDirective::ContainerStart { name, args }) => {
                let handler = self
                    .container_handlers
                    .iter()
                    .position(|h| h.name() == name);
                let location = self.config.create_context(line_num).location();
                let (handler, rendered) = match handler {
                    None => (None, line.to_owned()),
                    Some(idx) => {
                        let ctx = self.config.create_context(line_num);
                        match self.container_handlers[idx].start(args, &ctx) {
                            DirectiveOutput::Html(html) => (Some(idx), html),
                            DirectiveOutput::Markdown(md) => {
                                (Some(idx), self.process_with_depth(&md, depth + 1))
                            }
                            DirectiveOutput::Skip => (None, line.to_owned()),
                        }
                    }
                };
                self.open.push(OpenContainer {
                    name,
                    handler,
                    location,
                });
                rendered
            }
            Some(ParsedDirective::ContainerEnd { colon_count }) => match self.open.pop() {
                Some(OpenContainer {
                    handler: Some(idx), ..
                }) => self.container_handlers[idx]
                    .end(line_num)
                    .unwrap_or_default(),
                Some(_) => line.to_owned(),
                None => {
                    self.warnings.push(format!(
                        "{}: stray {} with no opening directive",
                        self.config.create_context(line_num).location(),
                        ":".repeat(colon_count)
                    ));
                    line.to_owned()
                }
            },
            None => line.to_owned(),
        }
    }

    fn finalize(&mut self) {
        for container in self.open.drain(..) {
            self.warnings.push(format!(
                "{}: unclosed container directive :::{} (missing closing :::)",
                container.location, container.name
            ));
        }
    }

    /// Warnings from the processor itself and from all handlers.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let mut all_warnings = self.warnings.clone();

        for handler in &self.leaf_handlers {
            all_warnings.extend(handler.warnings().iter().cloned());
        }
        for handler in &self.container_handlers {
            all_warnings.extend(handler.warnings().iter().cloned());
        }

        all_warnings
    }
}
