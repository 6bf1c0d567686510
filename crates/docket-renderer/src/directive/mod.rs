//! Block directives: `::name[content]{attrs}` and `:::name` ... `:::`.
//!
//! Directives are resolved on the markdown text before rendering. Leaf
//! handlers replace their line with HTML or with markdown that is processed
//! again; container handlers wrap the lines up to the matching `:::`.
//! [`Replacements`] substitutes placeholders in the rendered HTML afterwards.

mod args;
mod container;
mod context;
mod leaf;
mod output;
pub(crate) mod parser;
mod processor;
mod replacements;

pub use args::DirectiveArgs;
pub use container::ContainerDirective;
pub use context::DirectiveContext;
pub use leaf::LeafDirective;
pub use output::DirectiveOutput;
pub use processor::{DirectiveProcessor, DirectiveProcessorConfig, ReadFileFn};
pub use replacements::Replacements;
