//! `gix`-backed file history.

use std::path::{Path, PathBuf};

use gix::ObjectId;

use crate::{FileHistory, VcsError};

/// A git repository opened for history queries.
///
/// Holds a thread-safe handle; every query works on its own thread-local
/// view, so one instance can serve parallel compilations.
#[derive(Debug)]
pub struct GitRepository {
    repo: gix::ThreadSafeRepository,
    work_tree: PathBuf,
}

impl GitRepository {
    /// Discover the repository containing `dir`.
    pub fn discover(dir: &Path) -> Result<Self, VcsError> {
        let repo = gix::ThreadSafeRepository::discover(dir).map_err(|e| VcsError::Open {
            path: dir.to_path_buf(),
            source: Box::new(e),
        })?;
        let work_tree = repo
            .work_dir()
            .ok_or_else(|| VcsError::Bare(repo.git_dir().to_path_buf()))?;
        let work_tree = std::fs::canonicalize(work_tree).unwrap_or_else(|_| work_tree.to_path_buf());

        tracing::debug!(work_tree = %work_tree.display(), "Opened git repository");

        Ok(Self { repo, work_tree })
    }

    /// Root of the checked out work tree.
    #[must_use]
    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    fn strip_work_tree<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.strip_prefix(&self.work_tree).ok()
    }
}

impl FileHistory for GitRepository {
    fn make_relative_path(&self, path: &Path) -> Result<String, VcsError> {
        let canonical;
        let relative = match self.strip_work_tree(path) {
            Some(relative) => relative,
            None => {
                canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
                self.strip_work_tree(&canonical)
                    .ok_or_else(|| VcsError::OutsideWorkTree {
                        path: path.to_path_buf(),
                        work_tree: self.work_tree.clone(),
                    })?
            }
        };

        let parts = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>();
        Ok(parts.join("/"))
    }

    fn last_commit(&self, relative_path: &str) -> Result<Option<String>, VcsError> {
        let repo = self.repo.to_thread_local();
        let head = repo
            .head()
            .map_err(|e| VcsError::history(relative_path, e))?;
        let Some(head_id) = head.id() else {
            // Unborn branch, nothing committed yet.
            return Ok(None);
        };

        let mut current = head_id.detach();
        let Some(entry) = entry_id(&repo, current, relative_path)? else {
            return Ok(None);
        };

        // Follow one parent holding the same blob, the way `git log -- path`
        // simplifies history, until a commit differs from all its parents.
        loop {
            let parents = repo
                .find_commit(current)
                .map_err(|e| VcsError::history(relative_path, e))?
                .parent_ids()
                .map(gix::Id::detach)
                .collect::<Vec<_>>();

            let mut same = None;
            for parent in parents {
                if entry_id(&repo, parent, relative_path)? == Some(entry) {
                    same = Some(parent);
                    break;
                }
            }

            match same {
                Some(parent) => current = parent,
                None => return Ok(Some(current.to_string())),
            }
        }
    }
}

/// Blob id of `path` in the tree of `commit`, if the path exists there.
fn entry_id(
    repo: &gix::Repository,
    commit: ObjectId,
    path: &str,
) -> Result<Option<ObjectId>, VcsError> {
    let commit = repo
        .find_commit(commit)
        .map_err(|e| VcsError::history(path, e))?;
    let tree = commit.tree().map_err(|e| VcsError::history(path, e))?;
    let entry = tree
        .lookup_entry_by_path(path)
        .map_err(|e| VcsError::history(path, e))?;
    Ok(entry.map(|entry| entry.object_id()))
}
