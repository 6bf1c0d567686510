//! Documentation page compiler.
//!
//! Compiles one documentation source file into a page record: the page key
//! derived from its location, rendered HTML with resolved images, title,
//! plain text, the related-articles fragment and repository metadata.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use docket_compiler::{
//!     CompilationParameters, CompilerOptions, DocVersion, DocumentCompiler, FolderItem,
//!     SourceFile,
//! };
//! use docket_vcs::GitRepository;
//!
//! let history = Arc::new(GitRepository::discover(std::path::Path::new("."))?);
//! let options = CompilerOptions::new("Documentation").with_file_suffix("csharp", ".dotnet");
//! let compiler = DocumentCompiler::new(options, history);
//!
//! let page = compiler.compile(CompilationParameters::new(
//!     SourceFile::new("Documentation/5.1/Raven.Documentation.Pages/start.dotnet.markdown"),
//!     FolderItem::new("csharp"),
//!     DocVersion::from("5.1"),
//! ))?;
//! assert_eq!(page.key, "start");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod compiler;
mod error;
mod images;
mod key;
mod model;
mod repository;
mod text;

pub use compiler::{CompilerOptions, DEFAULT_IMAGE_CLASS, DEFAULT_PAGES_DIR, DocumentCompiler};
pub use error::{CompilationError, CompileFailure};
pub use images::{DEFAULT_URL_TEMPLATE, ImageUrlPolicy, TemplateImageUrls};
pub use model::{
    Category, CompilationParameters, DocVersion, DocumentationImage, DocumentationMapping,
    DocumentationPage, FolderItem, Language, PageFields, RepositoryData, SourceFile,
};
pub use repository::{PathCase, RepositoryMetadataRetriever, resolve_path_case};
pub use text::{TextContent, extract as extract_text};
