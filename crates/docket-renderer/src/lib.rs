//! Document builder for documentation pages.
//!
//! Turns a page's source text into HTML in four passes:
//!
//! 1. legacy brace blocks (`{CODE:...}`, `{NOTE}`, ...) become directives,
//! 2. `{HTML}` regions are set aside,
//! 3. directives are resolved: `::code` inlines sample regions, callout and
//!    `:::language` containers are expanded,
//! 4. the markdown is rendered with `pulldown-cmark`.
//!
//! Images are returned next to the HTML as [`ImageDirective`]s so the caller
//! decides their final URLs.

mod builder;
mod callout;
pub mod directive;
mod fence;
mod language;
mod legacy;
mod raw_html;
mod renderer;
mod samples;
mod state;

pub use builder::{BuildError, BuilderOptions, DocumentBuilder};
pub use callout::{CALLOUT_KINDS, CalloutDirective};
pub use language::LanguageDirective;
pub use legacy::LegacyError;
pub use raw_html::UnclosedRawHtml;
pub use renderer::{HtmlRenderer, ImageDirective, RenderResult};
pub use samples::{CodeSampleDirective, RegionError, SampleLanguage, extract_region};
pub use state::{escape_html, slugify};
