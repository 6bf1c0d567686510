//! Repository metadata of source files.

use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

use docket_vcs::{FileHistory, VcsError};

use crate::model::RepositoryData;

/// Outcome of looking up the on-disk casing of a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathCase {
    /// The path as the filesystem spells it.
    Resolved(PathBuf),
    /// Some component could not be listed or matched.
    Unavailable,
}

/// Spell `path` the way the filesystem stores it.
///
/// Each component is looked up in its parent directory, first exactly, then
/// ignoring ASCII case. Case-insensitive filesystems accept any spelling, but
/// version control records only the stored one.
pub fn resolve_path_case(path: &Path) -> PathCase {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => match find_entry(&resolved, name) {
                Some(entry) => resolved.push(entry),
                None => return PathCase::Unavailable,
            },
            other => resolved.push(other),
        }
    }
    PathCase::Resolved(resolved)
}

fn find_entry(dir: &Path, name: &OsStr) -> Option<PathBuf> {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    let mut case_insensitive = None;
    for entry in fs::read_dir(dir).ok()?.flatten() {
        let entry_name = entry.file_name();
        if entry_name == name {
            return Some(PathBuf::from(entry_name));
        }
        if case_insensitive.is_none()
            && entry_name
                .to_str()
                .zip(name.to_str())
                .is_some_and(|(a, b)| a.eq_ignore_ascii_case(b))
        {
            case_insensitive = Some(PathBuf::from(entry_name));
        }
    }
    case_insensitive
}

/// Looks up where a file sits in the repository and its last commit.
pub struct RepositoryMetadataRetriever<'a> {
    history: &'a dyn FileHistory,
}

impl<'a> RepositoryMetadataRetriever<'a> {
    #[must_use]
    pub fn new(history: &'a dyn FileHistory) -> Self {
        Self { history }
    }

    pub fn get_for_file(&self, path: &Path) -> Result<RepositoryData, VcsError> {
        let path = match resolve_path_case(path) {
            PathCase::Resolved(resolved) => resolved,
            PathCase::Unavailable => {
                tracing::warn!(path = %path.display(), "Could not resolve path casing");
                path.to_path_buf()
            }
        };

        let relative_path = self.history.make_relative_path(&path)?.replace('\\', "/");
        let last_commit_sha = self.history.last_commit(&relative_path)?;

        Ok(RepositoryData {
            last_commit_sha,
            relative_path,
        })
    }
}
