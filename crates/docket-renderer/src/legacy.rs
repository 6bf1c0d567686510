//! Legacy brace syntax normalization.
//!
//! Older pages use brace blocks that predate the directive syntax:
//!
//! ```text
//! {CODE:csharp map_reduce_0_0@Indexes\MapReduceIndexes.cs /}
//!
//! {CODE-BLOCK:json}
//! { "Name": "Orders" }
//! {CODE-BLOCK/}
//!
//! {NOTE: Before you start}
//! Body
//! {NOTE/}
//! ```
//!
//! They are rewritten to `::code`, fenced code blocks and callout containers.
//! Code references are pinned to the source-of-truth version, because the
//! samples of older versions live next to the pages they were written for.

use std::sync::LazyLock;

use regex::Regex;

use crate::fence::{FenceTracker, fenced_code};

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{CODE:(?P<lang>[\w.+#-]+)\s+(?P<label>[^@\s]+)@(?P<file>[^\s}]+)\s*/\}$")
        .unwrap()
});

static CODE_BLOCK_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{CODE-BLOCK(?::(?P<lang>[^}]*))?\}$").unwrap());

static CALLOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{(?P<name>NOTE|WARNING|INFO|DANGER|PANEL)(?::\s*(?P<title>[^}]*))?\}$").unwrap()
});

static CALLOUT_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{(?P<name>NOTE|WARNING|INFO|DANGER|PANEL)\s*/\}$").unwrap());

const CODE_BLOCK_END: &str = "{CODE-BLOCK/}";

/// A legacy block that could not be rewritten.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct LegacyError {
    /// Line of the offending block (1-indexed).
    pub line: usize,
    /// What is wrong with it.
    pub message: String,
}

impl LegacyError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Rewrite legacy brace blocks in `content`.
///
/// `source_version` is recorded on every `::code` reference.
pub(crate) fn normalize_legacy(content: &str, source_version: &str) -> Result<String, LegacyError> {
    let mut output = String::with_capacity(content.len());
    let mut fence = FenceTracker::new();
    let mut callouts: Vec<(String, usize)> = Vec::new();
    let mut lines = content.lines().enumerate();

    while let Some((idx, line)) = lines.next() {
        let line_num = idx + 1;

        if fence.update(line) || fence.in_fence() {
            output.push_str(line);
            output.push('\n');
            continue;
        }

        let trimmed = line.trim();

        if let Some(caps) = CODE_RE.captures(trimmed) {
            let file = caps["file"].replace('\\', "/");
            output.push_str(&format!(
                r#"::code[{}]{{lang="{}" file="{file}" version="{source_version}"}}"#,
                &caps["label"], &caps["lang"]
            ));
        } else if let Some(caps) = CODE_BLOCK_START_RE.captures(trimmed) {
            let lang = caps.name("lang").map_or("", |m| m.as_str().trim());
            let mut code = String::new();
            let mut closed = false;
            for (_, code_line) in lines.by_ref() {
                if code_line.trim() == CODE_BLOCK_END {
                    closed = true;
                    break;
                }
                code.push_str(code_line);
                code.push('\n');
            }
            if !closed {
                return Err(LegacyError::new(
                    line_num,
                    format!("{{CODE-BLOCK}} is missing its closing {CODE_BLOCK_END}"),
                ));
            }
            output.push_str(&fenced_code(lang, &code));
        } else if let Some(caps) = CALLOUT_RE.captures(trimmed) {
            let name = caps["name"].to_ascii_lowercase();
            let title = caps.name("title").map_or("", |m| m.as_str().trim());
            if title.is_empty() {
                output.push_str(&format!(":::{name}"));
            } else {
                output.push_str(&format!(":::{name}[{title}]"));
            }
            callouts.push((name, line_num));
        } else if let Some(caps) = CALLOUT_END_RE.captures(trimmed) {
            let name = caps["name"].to_ascii_lowercase();
            match callouts.pop() {
                Some((open, _)) if open == name => output.push_str(":::"),
                Some((open, open_line)) => {
                    return Err(LegacyError::new(
                        line_num,
                        format!(
                            "{{{}/}} closes {{{}}} opened on line {open_line}",
                            name.to_ascii_uppercase(),
                            open.to_ascii_uppercase()
                        ),
                    ));
                }
                None => {
                    return Err(LegacyError::new(
                        line_num,
                        format!("{{{}/}} has no opening block", name.to_ascii_uppercase()),
                    ));
                }
            }
        } else {
            output.push_str(line);
        }
        output.push('\n');
    }

    if let Some((name, line)) = callouts.pop() {
        return Err(LegacyError::new(
            line,
            format!(
                "{{{0}}} is missing its closing {{{0}/}}",
                name.to_ascii_uppercase()
            ),
        ));
    }

    if !content.ends_with('\n') && output.ends_with('\n') {
        output.pop();
    }
    Ok(output)
}
