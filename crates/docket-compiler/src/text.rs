//! Title, plain text and related-articles extraction from a parsed page.

use kuchikiki::NodeRef;

use crate::error::CompileFailure;

const RELATED_ARTICLES: &str = "Related articles";
const NO_TITLE: &str = "No title";

/// Plain text of a page, split from its related-articles section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextContent {
    pub text: String,
    /// Outer HTML of the nodes following the "Related articles" heading,
    /// one per line.
    pub related_articles_html: String,
}

/// Split the related-articles section off `root` and return the page text.
///
/// The section starts at the first child of `root` whose text reads
/// "Related articles" (any case) and runs to the end. Its nodes are detached
/// from the tree, so the text and any later serialization exclude them.
pub fn extract(root: &NodeRef) -> TextContent {
    let heading = root
        .children()
        .find(|node| node.text_contents().trim().eq_ignore_ascii_case(RELATED_ARTICLES));

    let related_articles_html = match heading {
        Some(heading) => {
            let section: Vec<NodeRef> = heading.inclusive_following_siblings().collect();
            let html = section
                .iter()
                .skip(1)
                .filter(|node| !is_blank_text(node))
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            for node in &section {
                node.detach();
            }
            html
        }
        None => String::new(),
    };

    TextContent {
        text: root.text_contents().trim().to_owned(),
        related_articles_html,
    }
}

fn is_blank_text(node: &NodeRef) -> bool {
    node.as_text()
        .is_some_and(|text| text.borrow().trim().is_empty())
}

/// Text of the first `h1` child of `root`, or `"No title"`.
pub(crate) fn extract_title(root: &NodeRef) -> String {
    root.children()
        .find(|node| {
            node.as_element()
                .is_some_and(|element| &*element.name.local == "h1")
        })
        .map_or_else(|| NO_TITLE.to_owned(), |h1| h1.text_contents().trim().to_owned())
}

/// Titles are written `Section: Topic`; a space before the colon is an error.
pub(crate) fn validate_title(title: &str) -> Result<(), CompileFailure> {
    if title.contains(" :") {
        return Err(CompileFailure::TitleFormat(title.to_owned()));
    }
    Ok(())
}
