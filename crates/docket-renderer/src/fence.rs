//! Code fence handling for line-based rewrite passes.
//!
//! Every text pass skips the inside of fenced code blocks, and passes that
//! emit code wrap it in a fence no line of the code can close.

/// Tracks code fence state during line-by-line processing.
///
/// Fences use backticks or tildes (three or more). The closing fence must
/// use the same character and be at least as long as the opening fence.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    fence_char: Option<char>,
    fence_len: usize,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether the last line seen left us inside a fenced block.
    pub(crate) fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Feed the next line. Returns `true` if it opened or closed a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();

        match self.fence_char {
            Some(fence_char) => {
                let closes = fence_run(trimmed).is_some_and(|(ch, len)| {
                    ch == fence_char
                        && len >= self.fence_len
                        && trimmed[len..].chars().all(char::is_whitespace)
                });
                if closes {
                    self.fence_char = None;
                    self.fence_len = 0;
                }
                closes
            }
            None => match fence_run(trimmed) {
                Some((ch, len)) => {
                    self.fence_char = Some(ch);
                    self.fence_len = len;
                    true
                }
                None => false,
            },
        }
    }
}

/// Leading run of three or more backticks or tildes.
fn fence_run(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next().filter(|&c| c == '`' || c == '~')?;
    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

/// Wrap `code` in a backtick fence longer than any backtick run inside it.
pub(crate) fn fenced_code(info: &str, code: &str) -> String {
    let longest = code
        .lines()
        .filter_map(|line| fence_run(line.trim_start()))
        .filter(|(ch, _)| *ch == '`')
        .map(|(_, len)| len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest.max(2) + 1);

    let mut out = String::with_capacity(code.len() + info.len() + 2 * fence.len() + 3);
    out.push_str(&fence);
    out.push_str(info);
    out.push('\n');
    out.push_str(code.trim_end_matches('\n'));
    out.push('\n');
    out.push_str(&fence);
    out
}
