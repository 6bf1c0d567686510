//! Directive line parsing.
//!
//! Directives occupy a whole line: `::name[...]{...}` for leaves,
//! `:::name[...]{...}` to open a container and a bare `:::` to close it.

use super::DirectiveArgs;

/// Directive recognised on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParsedDirective {
    /// Leaf directive: `::name[content]{attrs}`
    Leaf { name: String, args: DirectiveArgs },
    /// Container opening: `:::name[content]{attrs}`
    ContainerStart { name: String, args: DirectiveArgs },
    /// Container closing: `:::`
    ContainerEnd { colon_count: usize },
}

/// Parse a line as a block directive.
///
/// Returns `None` for ordinary lines, including lines where the directive
/// is followed by other text.
pub(crate) fn parse_block_line(line: &str) -> Option<ParsedDirective> {
    let trimmed = line.trim();
    let colon_count = trimmed.chars().take_while(|&c| c == ':').count();
    if colon_count < 2 {
        return None;
    }

    let after_colons = &trimmed[colon_count..];
    if after_colons.is_empty() {
        return (colon_count >= 3).then_some(ParsedDirective::ContainerEnd { colon_count });
    }

    let name_end = after_colons
        .find(|c: char| c == '[' || c == '{' || c.is_whitespace())
        .unwrap_or(after_colons.len());
    let name = &after_colons[..name_end];
    if !is_valid_directive_name(name) {
        return None;
    }

    let rest = &after_colons[name_end..];
    let (content, consumed) = delimited(rest, '[', ']')?;
    let rest = &rest[consumed..];
    let (attrs, consumed) = delimited(rest, '{', '}')?;
    let rest = &rest[consumed..];

    // Containers may carry a trailing title; leaves must end here.
    let content = if colon_count >= 3 && content.is_empty() {
        rest.trim()
    } else if rest.trim().is_empty() {
        content
    } else {
        return None;
    };

    let args = DirectiveArgs::parse(content, attrs);
    let name = name.to_owned();
    Some(if colon_count == 2 {
        ParsedDirective::Leaf { name, args }
    } else {
        ParsedDirective::ContainerStart { name, args }
    })
}

/// Valid names contain only alphanumeric characters, hyphens, and underscores.
fn is_valid_directive_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Take a balanced `open ... close` group from the start of `s`.
///
/// Returns the inner text and the bytes consumed; an absent group yields
/// `("", 0)` and an unbalanced one yields `None`.
fn delimited(s: &str, open: char, close: char) -> Option<(&str, usize)> {
    if !s.starts_with(open) {
        return Some(("", 0));
    }

    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some((&s[open.len_utf8()..i], i + close.len_utf8()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(line: &str) -> (String, DirectiveArgs) {
        match parse_block_line(line) {
            Some(ParsedDirective::Leaf { name, args }) => (name, args),
            other => panic!("expected leaf directive, got {other:?}"),
        }
    }

    #[test]
    fn test_leaf_directive() {
        let (name, args) = leaf(r#"::code[orders_0]{lang="csharp" file="Indexes/Orders.cs"}"#);
        assert_eq!(name, "code");
        assert_eq!(args.content, "orders_0");
        assert_eq!(args.get("file"), Some("Indexes/Orders.cs"));
    }

    #[test]
    fn test_leaf_with_surrounding_whitespace() {
        let (name, _) = leaf("   ::toc   ");
        assert_eq!(name, "toc");
    }

    #[test]
    fn test_leaf_with_trailing_text_is_not_a_directive() {
        assert_eq!(parse_block_line("::code[a] and more"), None);
    }

    #[test]
    fn test_inline_colon_is_not_a_directive() {
        assert_eq!(parse_block_line("Note: read this"), None);
        assert_eq!(parse_block_line(":emoji[smile]"), None);
        assert_eq!(parse_block_line("https://example.com"), None);
    }

    #[test]
    fn test_container_start() {
        let parsed = parse_block_line(":::note[Before you start]");
        assert_eq!(
            parsed,
            Some(ParsedDirective::ContainerStart {
                name: "note".to_owned(),
                args: DirectiveArgs::parse("Before you start", ""),
            })
        );
    }

    #[test]
    fn test_container_start_with_bare_title() {
        let parsed = parse_block_line("::: warning Mind the gap");
        assert_eq!(parsed, None, "name must follow the colons directly");

        let parsed = parse_block_line(":::warning Mind the gap");
        assert_eq!(
            parsed,
            Some(ParsedDirective::ContainerStart {
                name: "warning".to_owned(),
                args: DirectiveArgs::parse("Mind the gap", ""),
            })
        );
    }

    #[test]
    fn test_container_end() {
        assert_eq!(
            parse_block_line(":::"),
            Some(ParsedDirective::ContainerEnd { colon_count: 3 })
        );
        assert_eq!(
            parse_block_line("  ::::  "),
            Some(ParsedDirective::ContainerEnd { colon_count: 4 })
        );
        assert_eq!(parse_block_line("::"), None);
    }

    #[test]
    fn test_nested_brackets() {
        let (_, args) = leaf("::code[a[0]]{lang=go}");
        assert_eq!(args.content, "a[0]");
    }

    #[test]
    fn test_unbalanced_brackets() {
        assert_eq!(parse_block_line("::code[oops"), None);
    }
}
