//! Container directive trait.
//!
//! Container directives wrap content: `:::name[content]{attrs}` ... `:::`

use super::{DirectiveArgs, DirectiveContext, DirectiveOutput};

/// Handler for container directives.
///
/// The processor keeps the stack of open containers and only calls
/// [`end`](Self::end) for a container this handler started.
pub trait ContainerDirective: Send {
    /// Directive name matched against `:::name`.
    fn name(&self) -> &str;

    /// Handle the opening line.
    ///
    /// [`DirectiveOutput::Skip`] leaves the line as written and does not
    /// open a container.
    fn start(&mut self, args: DirectiveArgs, ctx: &DirectiveContext) -> DirectiveOutput;

    /// Handle the matching closing `:::`; `None` emits nothing.
    fn end(&mut self, line: usize) -> Option<String>;

    /// Problems found while processing.
    fn warnings(&self) -> &[String] {
        &[]
    }
}
