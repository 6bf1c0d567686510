//! Single-pass placeholder substitution for rendered HTML.

use std::collections::HashMap;

use regex::{Captures, Regex};

/// Collects placeholder substitutions and applies them in one pass.
///
/// All patterns are matched against the original string only, so text
/// inserted by one `apply` is not scanned again by that call. A later
/// `apply` on the same string sees it like any other text.
///
/// ```
/// use docket_renderer::directive::Replacements;
///
/// let mut html = "<p><!--raw:0--></p>".to_owned();
/// let mut replacements = Replacements::new();
/// replacements.add("<!--raw:0-->", "<b>kept</b>");
/// replacements.apply(&mut html);
///
/// assert_eq!(html, "<p><b>kept</b></p>");
/// ```
#[derive(Debug, Default)]
pub struct Replacements {
    items: Vec<(String, String)>,
}

impl Replacements {
    /// Create a new empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Register a substitution of every occurrence of `from` with `to`.
    ///
    /// When the same `from` is added twice, the first registration wins.
    pub fn add(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let from = from.into();
        if !from.is_empty() {
            self.items.push((from, to.into()));
        }
    }

    /// Apply all substitutions.
    pub fn apply(self, html: &mut String) {
        if self.items.is_empty() {
            return;
        }

        // Longer patterns first so that a pattern which prefixes another
        // one cannot shadow it.
        let mut patterns = self
            .items
            .iter()
            .map(|(from, _)| regex::escape(from))
            .collect::<Vec<_>>();
        patterns.sort_by_key(|p| std::cmp::Reverse(p.len()));

        let Ok(matcher) = Regex::new(&patterns.join("|")) else {
            // Escaped literals always compile; fall back to sequential
            // replacement if the alternation grows past the size limit.
            for (from, to) in self.items {
                *html = html.replace(&from, &to);
            }
            return;
        };

        let mut lookup: HashMap<String, String> = HashMap::with_capacity(self.items.len());
        for (from, to) in self.items {
            lookup.entry(from).or_insert(to);
        }

        let replaced = matcher.replace_all(html.as_str(), |caps: &Captures<'_>| {
            lookup.get(&caps[0]).cloned().unwrap_or_else(|| caps[0].to_owned())
        });
        if let std::borrow::Cow::Owned(replaced) = replaced {
            *html = replaced;
        }
    }

    /// Whether no substitutions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of registered substitutions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
