//! Directive argument parsing.
//!
//! Parses the `[content]{.class key="value"}` part of a directive line.

use std::collections::BTreeMap;

/// Parsed arguments from directive syntax.
///
/// ```
/// use docket_renderer::directive::DirectiveArgs;
///
/// let args = DirectiveArgs::parse("orders_0", r#"lang="csharp" file='Indexes/Orders.cs'"#);
/// assert_eq!(args.content, "orders_0");
/// assert_eq!(args.get("lang"), Some("csharp"));
/// assert_eq!(args.get("file"), Some("Indexes/Orders.cs"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectiveArgs {
    /// Content from brackets (empty if not provided).
    pub content: String,
    /// Classes from attributes: `{.wide .dark}`.
    pub classes: Vec<String>,
    /// Key-value attributes: `{key="value"}`.
    pub attrs: BTreeMap<String, String>,
}

impl DirectiveArgs {
    /// Parse bracket content and the attribute string (without braces).
    #[must_use]
    pub fn parse(content: &str, attrs_str: &str) -> Self {
        let mut args = Self {
            content: content.trim().to_owned(),
            ..Self::default()
        };

        let mut remaining = attrs_str.trim();
        while !remaining.is_empty() {
            if let Some(rest) = remaining.strip_prefix('.') {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '.')
                    .unwrap_or(rest.len());
                if end > 0 {
                    args.classes.push(rest[..end].to_owned());
                }
                remaining = &rest[end..];
            } else if let Some((key, value, rest)) = parse_key_value(remaining) {
                args.attrs.insert(key.to_owned(), value.to_owned());
                remaining = rest;
            } else {
                // Skip one unrecognized character
                let skip = remaining.chars().next().map_or(1, char::len_utf8);
                remaining = &remaining[skip..];
            }
            remaining = remaining.trim_start();
        }

        args
    }

    /// Get an attribute value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Get a non-empty attribute value, or a message naming the missing key.
    pub fn require(&self, key: &str) -> Result<&str, String> {
        match self.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(format!("missing required attribute '{key}'")),
        }
    }
}

/// Parse `key="value"`, `key='value'` or `key=value` from the start of `s`.
///
/// Returns the key, the value and the unparsed rest.
fn parse_key_value(s: &str) -> Option<(&str, &str, &str)> {
    let eq_pos = s.find('=')?;
    let key = s[..eq_pos].trim();

    if key.is_empty() || key.contains(char::is_whitespace) || key.starts_with('.') {
        return None;
    }

    let after_eq = &s[eq_pos + 1..];
    for quote in ['"', '\''] {
        if let Some(stripped) = after_eq.strip_prefix(quote) {
            let end = stripped.find(quote)?;
            return Some((key, &stripped[..end], &stripped[end + 1..]));
        }
    }

    let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
    Some((key, &after_eq[..end], &after_eq[end..]))
}
