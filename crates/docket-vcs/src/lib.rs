//! Version-control queries for documentation sources.
//!
//! The compiler only needs two answers from version control: where a file
//! lives relative to the repository root, and which commit last changed it.
//! [`FileHistory`] is that interface; [`GitRepository`] answers it from a git
//! repository through `gix`.

mod git;

use std::path::{Path, PathBuf};

pub use git::GitRepository;

/// Version-control error.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// No repository could be opened from the given directory.
    #[error("Failed to open git repository from {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: Box<gix::discover::Error>,
    },
    /// Repository has no work tree to resolve paths against.
    #[error("Git repository at {} is bare", .0.display())]
    Bare(PathBuf),
    /// File is not inside the repository work tree.
    #[error("{} is outside the repository work tree {}", path.display(), work_tree.display())]
    OutsideWorkTree { path: PathBuf, work_tree: PathBuf },
    /// Reading history failed.
    #[error("Failed to read git history of '{path}'")]
    History {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl VcsError {
    pub(crate) fn history(
        path: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::History {
            path: path.to_owned(),
            source: Box::new(source),
        }
    }
}

/// File history queries used by the compiler.
///
/// Implementations must be shareable across worker threads.
pub trait FileHistory: Send + Sync {
    /// Path of `path` relative to the repository root, `/`-separated.
    fn make_relative_path(&self, path: &Path) -> Result<String, VcsError>;

    /// Id of the newest commit that changed `relative_path`.
    ///
    /// Returns `None` when the file was never committed.
    fn last_commit(&self, relative_path: &str) -> Result<Option<String>, VcsError>;
}
