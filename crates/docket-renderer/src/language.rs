//! `:::language[name]` sections.
//!
//! A page carries the text of every client language; sections written for
//! another language than the page's are dropped before rendering. The
//! container only marks the section boundaries, [`filter_languages`] does
//! the dropping.

use crate::directive::{ContainerDirective, DirectiveArgs, DirectiveContext, DirectiveOutput};
use crate::fence::FenceTracker;

const START_PREFIX: &str = "<!-- language:";
const MARKER_SUFFIX: &str = " -->";
const END_MARKER: &str = "<!-- /language -->";

/// Marks `:::language[name]` section boundaries.
#[derive(Default)]
pub struct LanguageDirective {
    warnings: Vec<String>,
}

impl ContainerDirective for LanguageDirective {
    fn name(&self) -> &'static str {
        "language"
    }

    fn start(&mut self, args: DirectiveArgs, ctx: &DirectiveContext) -> DirectiveOutput {
        let name = args.content.trim().to_ascii_lowercase();
        if name.is_empty() || name.contains(char::is_whitespace) {
            self.warnings.push(format!(
                "{}: :::language needs a single language name, got '{}'",
                ctx.location(),
                args.content
            ));
        }
        DirectiveOutput::html(format!("{START_PREFIX}{name}{MARKER_SUFFIX}"))
    }

    fn end(&mut self, _line: usize) -> Option<String> {
        Some(END_MARKER.to_owned())
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Drop language sections not written for `language`, and all markers.
pub(crate) fn filter_languages(markdown: &str, language: &str) -> String {
    let mut output = String::with_capacity(markdown.len());
    let mut fence = FenceTracker::new();
    // Whether each open section is kept.
    let mut sections: Vec<bool> = Vec::new();

    for line in markdown.lines() {
        let in_code = fence.update(line) || fence.in_fence();
        if !in_code {
            let trimmed = line.trim();
            if let Some(name) = trimmed
                .strip_prefix(START_PREFIX)
                .and_then(|rest| rest.strip_suffix(MARKER_SUFFIX))
            {
                sections.push(name.eq_ignore_ascii_case(language));
                continue;
            }
            if trimmed == END_MARKER {
                sections.pop();
                continue;
            }
        }
        if sections.iter().all(|&keep| keep) {
            output.push_str(line);
            output.push('\n');
        }
    }

    if !markdown.ends_with('\n') && output.ends_with('\n') {
        output.pop();
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DirectiveProcessor;
    use pretty_assertions::assert_eq;

    const PAGE: &str = "\
Common
:::language[csharp]
C# only
```
<!-- /language -->
```
:::
:::language[Java]
Java only
:::
End
";

    fn marked() -> String {
        DirectiveProcessor::new()
            .with_container(LanguageDirective::default())
            .process(PAGE)
    }

    #[test]
    fn test_markers() {
        assert_eq!(
            marked(),
            "Common\n<!-- language:csharp -->\nC# only\n```\n<!-- /language -->\n```\n\
             <!-- /language -->\n<!-- language:java -->\nJava only\n<!-- /language -->\nEnd\n"
        );
    }

    #[test]
    fn test_filter_keeps_matching_language() {
        assert_eq!(
            filter_languages(&marked(), "csharp"),
            "Common\nC# only\n```\n<!-- /language -->\n```\nEnd\n"
        );
        assert_eq!(filter_languages(&marked(), "java"), "Common\nJava only\nEnd\n");
        assert_eq!(filter_languages(&marked(), "python"), "Common\nEnd\n");
    }

    #[test]
    fn test_empty_language_name_warns() {
        let mut processor = DirectiveProcessor::new().with_container(LanguageDirective::default());
        let _output = processor.process(":::language\nx\n:::");
        assert_eq!(
            processor.warnings(),
            vec!["line 1: :::language needs a single language name, got ''"]
        );
    }
}
