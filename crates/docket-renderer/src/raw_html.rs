//! `{HTML}` ... `{HTML/}` regions.
//!
//! Region bodies are cut out of the markdown and replaced by HTML comment
//! placeholders standing on their own line, so the renderer passes them
//! through untouched. [`RawHtmlBlocks::restore`] puts the bodies back.

use crate::directive::Replacements;
use crate::fence::FenceTracker;

const START: &str = "{HTML}";
const END: &str = "{HTML/}";

/// `{HTML}` region without its closing `{HTML/}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {{HTML}} is missing its closing {{HTML/}}")]
pub struct UnclosedRawHtml {
    /// Line of the opening `{HTML}`.
    pub line: usize,
}

/// Raw HTML bodies set aside until the markdown is rendered.
#[derive(Debug, Default)]
pub(crate) struct RawHtmlBlocks {
    blocks: Vec<String>,
}

impl RawHtmlBlocks {
    /// Cut every region out of `content`, returning the rewritten markdown.
    pub(crate) fn extract(&mut self, content: &str) -> Result<String, UnclosedRawHtml> {
        let mut output = String::with_capacity(content.len());
        let mut fence = FenceTracker::new();
        let mut lines = content.lines().enumerate();

        while let Some((idx, line)) = lines.next() {
            if fence.update(line) || fence.in_fence() || line.trim() != START {
                output.push_str(line);
                output.push('\n');
                continue;
            }

            let mut body = String::new();
            let mut closed = false;
            for (_, html_line) in lines.by_ref() {
                if html_line.trim() == END {
                    closed = true;
                    break;
                }
                body.push_str(html_line);
                body.push('\n');
            }
            if !closed {
                return Err(UnclosedRawHtml { line: idx + 1 });
            }

            let placeholder = placeholder(self.blocks.len());
            self.blocks.push(body.trim_end_matches('\n').to_owned());
            output.push('\n');
            output.push_str(&placeholder);
            output.push_str("\n\n");
        }

        if !content.ends_with('\n') && output.ends_with('\n') {
            output.pop();
        }
        Ok(output)
    }

    /// Put the region bodies back into rendered HTML.
    pub(crate) fn restore(&self, html: &mut String) {
        if self.is_empty() {
            return;
        }
        let mut replacements = Replacements::with_capacity(self.blocks.len());
        for (index, body) in self.blocks.iter().enumerate() {
            replacements.add(placeholder(index), body.clone());
        }
        replacements.apply(html);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

fn placeholder(index: usize) -> String {
    format!("<!--docket-raw:{index}-->")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_and_restore() {
        let mut blocks = RawHtmlBlocks::default();
        let markdown = blocks
            .extract("Intro\n{HTML}\n<table><tr><td>*x*</td></tr></table>\n{HTML/}\nOutro\n")
            .unwrap();
        assert_eq!(markdown, "Intro\n\n<!--docket-raw:0-->\n\nOutro\n");

        let mut html = "<p>Intro</p>\n<!--docket-raw:0-->\n<p>Outro</p>\n".to_owned();
        blocks.restore(&mut html);
        assert_eq!(
            html,
            "<p>Intro</p>\n<table><tr><td>*x*</td></tr></table>\n<p>Outro</p>\n"
        );
    }

    #[test]
    fn test_multiple_regions_keep_their_order() {
        let mut blocks = RawHtmlBlocks::default();
        let markdown = blocks
            .extract("{HTML}\n<b>1</b>\n{HTML/}\n{HTML}\n<b>2</b>\n{HTML/}")
            .unwrap();
        assert!(markdown.contains("<!--docket-raw:0-->"));
        assert!(markdown.contains("<!--docket-raw:1-->"));

        let mut html = "<!--docket-raw:1--><!--docket-raw:0-->".to_owned();
        blocks.restore(&mut html);
        assert_eq!(html, "<b>2</b><b>1</b>");
    }

    #[test]
    fn test_region_inside_fence_is_left_alone() {
        let mut blocks = RawHtmlBlocks::default();
        let input = "```\n{HTML}\n```";
        assert_eq!(blocks.extract(input).unwrap(), input);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_unclosed_region() {
        let mut blocks = RawHtmlBlocks::default();
        let err = blocks.extract("a\nb\n{HTML}\n<div>").unwrap_err();
        assert_eq!(err, UnclosedRawHtml { line: 3 });
        assert_eq!(err.to_string(), "line 3: {HTML} is missing its closing {HTML/}");
    }
}
