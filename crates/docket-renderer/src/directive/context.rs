//! Directive processing context.

use std::io;
use std::path::{Path, PathBuf};

/// Context handed to directive handlers: source location and file access.
///
/// ```
/// use std::path::Path;
/// use docket_renderer::directive::DirectiveContext;
///
/// let ctx = DirectiveContext {
///     source_path: Some(Path::new("Documentation/5.1/Pages/indexes.markdown")),
///     base_dir: Path::new("Documentation"),
///     line: 12,
///     read_file: &|path| std::fs::read_to_string(path),
/// };
///
/// assert_eq!(
///     ctx.resolve_path("5.1/Samples/Orders.cs"),
///     Path::new("Documentation/5.1/Samples/Orders.cs")
/// );
/// assert_eq!(ctx.location(), "Documentation/5.1/Pages/indexes.markdown:12");
/// ```
pub struct DirectiveContext<'a> {
    /// Path to the source file being built (if known).
    pub source_path: Option<&'a Path>,
    /// Base directory for resolving relative paths.
    pub base_dir: &'a Path,
    /// Line number where the directive appears (1-indexed).
    pub line: usize,
    /// Callback to read a file.
    pub read_file: &'a dyn Fn(&Path) -> io::Result<String>,
}

impl DirectiveContext<'_> {
    /// Join a relative path onto the base directory.
    #[must_use]
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    /// Resolve a relative path, refusing anything that escapes the base directory.
    ///
    /// Returns `None` when the target does not exist, since both paths are
    /// canonicalized before comparison.
    #[must_use]
    pub fn resolve_path_safe(&self, relative: &str) -> Option<PathBuf> {
        let canonical = self.resolve_path(relative).canonicalize().ok()?;
        let canonical_base = self.base_dir.canonicalize().ok()?;

        canonical.starts_with(&canonical_base).then_some(canonical)
    }

    /// Read a file through the context's callback.
    pub fn read(&self, path: &Path) -> io::Result<String> {
        (self.read_file)(path)
    }

    /// `path:line` of the directive, for warnings.
    #[must_use]
    pub fn location(&self) -> String {
        match self.source_path {
            Some(path) => format!("{}:{}", path.display(), self.line),
            None => format!("line {}", self.line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context(base_dir: &Path) -> DirectiveContext<'_> {
        DirectiveContext {
            source_path: None,
            base_dir,
            line: 3,
            read_file: &|_| Ok("sample".to_owned()),
        }
    }

    #[test]
    fn test_location_without_source() {
        assert_eq!(context(Path::new(".")).location(), "line 3");
    }

    #[test]
    fn test_read_uses_callback() {
        let ctx = context(Path::new("."));
        assert_eq!(ctx.read(Path::new("any.cs")).unwrap(), "sample");
    }

    #[test]
    fn test_resolve_path_safe_within_base() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("5.1/Samples")).unwrap();
        std::fs::write(temp_dir.path().join("5.1/Samples/Orders.cs"), "").unwrap();

        let ctx = context(temp_dir.path());
        let resolved = ctx.resolve_path_safe("5.1/Samples/Orders.cs").unwrap();
        assert!(resolved.ends_with("5.1/Samples/Orders.cs"));
    }

    #[test]
    fn test_resolve_path_safe_blocks_traversal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let base_dir = temp_dir.path().join("Documentation");
        std::fs::create_dir(&base_dir).unwrap();
        std::fs::write(temp_dir.path().join("secret.txt"), "secret").unwrap();

        let ctx = context(&base_dir);
        assert!(ctx.resolve_path_safe("../secret.txt").is_none());
    }

    #[test]
    fn test_resolve_path_safe_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ctx = context(temp_dir.path());
        assert!(ctx.resolve_path_safe("missing.cs").is_none());
    }
}
