//! Callout containers: `:::note`, `:::warning`, `:::info`, `:::danger`, `:::panel`.

use std::fmt::Write;

use crate::directive::{ContainerDirective, DirectiveArgs, DirectiveContext, DirectiveOutput};
use crate::state::escape_html;

/// Container names rendered as callouts.
pub const CALLOUT_KINDS: [&str; 5] = ["note", "warning", "info", "danger", "panel"];

/// Wraps its content in `<div class="callout callout-{kind}">`.
///
/// Blank lines surround the opening and closing tags so the content is
/// still parsed as markdown.
pub struct CalloutDirective {
    kind: &'static str,
}

impl CalloutDirective {
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self { kind }
    }
}

impl ContainerDirective for CalloutDirective {
    fn name(&self) -> &str {
        self.kind
    }

    fn start(&mut self, args: DirectiveArgs, _ctx: &DirectiveContext) -> DirectiveOutput {
        let mut html = format!(r#"<div class="callout callout-{}">"#, self.kind);
        if !args.content.is_empty() {
            write!(
                html,
                "\n<div class=\"callout-title\">{}</div>",
                escape_html(&args.content)
            )
            .unwrap();
        }
        html.push('\n');
        DirectiveOutput::html(html)
    }

    fn end(&mut self, _line: usize) -> Option<String> {
        Some("\n</div>\n".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DirectiveProcessor;
    use crate::renderer::HtmlRenderer;
    use pretty_assertions::assert_eq;

    fn processor() -> DirectiveProcessor {
        CALLOUT_KINDS
            .into_iter()
            .fold(DirectiveProcessor::new(), |p, kind| {
                p.with_container(CalloutDirective::new(kind))
            })
    }

    #[test]
    fn test_callout_markup() {
        let output = processor().process(":::note[Before <you> start]\nRead **this**.\n:::\nAfter");
        assert_eq!(
            output,
            "<div class=\"callout callout-note\">\n\
             <div class=\"callout-title\">Before &lt;you&gt; start</div>\n\
             \n\
             Read **this**.\n\
             \n\
             </div>\n\
             \n\
             After"
        );
    }

    #[test]
    fn test_callout_content_is_markdown() {
        let markdown = processor().process("Intro\n:::warning\nBe **careful**.\n:::\nOutro");
        let html = HtmlRenderer::new().render_markdown(&markdown).html;
        assert_eq!(
            html,
            "<p>Intro</p>\n\
             <div class=\"callout callout-warning\">\n\
             <p>Be <strong>careful</strong>.</p>\n\
             </div>\n\
             <p>Outro</p>\n"
        );
    }

    #[test]
    fn test_nested_callouts() {
        let markdown = processor().process(":::panel[Outer]\n:::info\nx\n:::\n:::");
        let html = HtmlRenderer::new().render_markdown(&markdown).html;
        assert!(html.contains(r#"<div class="callout callout-panel">"#));
        assert!(html.contains(r#"<div class="callout callout-info">"#));
        assert_eq!(html.matches("</div>").count(), 3);
    }
}
