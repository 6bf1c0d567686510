//! Leaf directive trait.
//!
//! Leaf directives take a whole line: `::name[content]{attrs}`

use super::{DirectiveArgs, DirectiveContext, DirectiveOutput};

/// Handler for leaf directives: `::name[content]{attrs}`
///
/// Each document gets its own processor, so handlers are `Send` and may keep
/// per-document state.
///
/// ```
/// use docket_renderer::directive::{
///     DirectiveArgs, DirectiveContext, DirectiveOutput, LeafDirective,
/// };
///
/// struct Divider;
///
/// impl LeafDirective for Divider {
///     fn name(&self) -> &str { "divider" }
///
///     fn process(&mut self, _args: DirectiveArgs, _ctx: &DirectiveContext) -> DirectiveOutput {
///         DirectiveOutput::html("<hr class=\"divider\">")
///     }
/// }
/// ```
pub trait LeafDirective: Send {
    /// Directive name matched against `::name`.
    fn name(&self) -> &str;

    /// Produce the replacement for the directive line.
    fn process(&mut self, args: DirectiveArgs, ctx: &DirectiveContext) -> DirectiveOutput;

    /// Problems found while processing.
    fn warnings(&self) -> &[String] {
        &[]
    }
}
