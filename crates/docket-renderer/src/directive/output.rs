//! Directive output types.

/// What a directive handler produced for its line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectiveOutput {
    /// HTML emitted in place of the directive line.
    Html(String),
    /// Markdown that is processed again for nested directives.
    ///
    /// Used by `::code` to emit a fenced block.
    Markdown(String),
    /// Leave the directive line untouched.
    Skip,
}

impl DirectiveOutput {
    /// Create an HTML output.
    #[must_use]
    pub fn html(s: impl Into<String>) -> Self {
        Self::Html(s.into())
    }

    /// Create a markdown output.
    #[must_use]
    pub fn markdown(s: impl Into<String>) -> Self {
        Self::Markdown(s.into())
    }
}
