//! Page key extraction.

use std::path::{Path, PathBuf};

use crate::error::CompileFailure;

/// Derive the page key of `file` from its place under `pages_dir`.
///
/// The pages directory and the file extension are removed, separators are
/// normalized to `/`, one leading `/` is dropped, then `suffix` is removed
/// when the key ends with it (`start.dotnet.markdown` gives `start`).
pub(crate) fn extract_key(
    file: &Path,
    pages_dir: &Path,
    suffix: Option<&str>,
) -> Result<String, CompileFailure> {
    let file_str = normalize(&absolute(file));
    let pages_str = normalize(&absolute(pages_dir));
    let pages_str = pages_str.trim_end_matches('/');

    let outside = || CompileFailure::OutsidePagesDirectory {
        file: file.to_path_buf(),
        pages_dir: pages_dir.to_path_buf(),
    };
    let relative = file_str.strip_prefix(pages_str).ok_or_else(outside)?;
    if !relative.starts_with('/') {
        return Err(outside());
    }

    let mut key = strip_extension(relative);
    key = key.strip_prefix('/').unwrap_or(key);
    if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
        key = key.strip_suffix(suffix).unwrap_or(key);
    }

    if key.is_empty() {
        return Err(CompileFailure::EmptyKey);
    }
    Ok(key.to_owned())
}

/// `path` joined onto the working directory when it is relative.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(0) | None => path,
        Some(dot) => &path[..name_start + dot],
    }
}
