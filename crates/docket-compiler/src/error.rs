//! Compilation errors.

use std::io;
use std::path::PathBuf;

use docket_renderer::BuildError;
use docket_vcs::VcsError;

/// A source file could not be compiled into a page.
///
/// The underlying [`CompileFailure`] is available through
/// [`std::error::Error::source`].
#[derive(Debug, thiserror::Error)]
#[error("Could not compile '{}'", source_path.display())]
pub struct CompilationError {
    pub source_path: PathBuf,
    #[source]
    pub cause: CompileFailure,
}

/// Why a compilation failed.
#[derive(Debug, thiserror::Error)]
pub enum CompileFailure {
    #[error("'{}' is not inside the pages directory '{}'", file.display(), pages_dir.display())]
    OutsidePagesDirectory { file: PathBuf, pages_dir: PathBuf },
    #[error("Page key is empty")]
    EmptyKey,
    #[error("Failed to read source file")]
    Io(#[source] io::Error),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("Could not find image in '{}' for article '{key}'", path.display())]
    MissingImage { path: PathBuf, key: String },
    #[error("Invalid image path '{src}' in article '{key}'. It cannot start from dot ('.')")]
    InvalidImagePath { src: String, key: String },
    #[error(
        "Image key '{image_key}' points to both '{}' and '{}'",
        first.display(),
        second.display()
    )]
    ConflictingImageKey {
        image_key: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("Please remove space before the colon in the title '{0}'")]
    TitleFormat(String),
    #[error(transparent)]
    Repository(#[from] VcsError),
}

impl CompileFailure {
    pub(crate) fn at(self, source_path: impl Into<PathBuf>) -> CompilationError {
        CompilationError {
            source_path: source_path.into(),
            cause: self,
        }
    }
}
