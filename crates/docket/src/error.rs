//! CLI error types.

use std::error::Error;
use std::path::PathBuf;

use docket_compiler::CompilationError;
use docket_config::ConfigError;
use docket_vcs::VcsError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Repository(#[from] VcsError),

    #[error(transparent)]
    Compilation(#[from] CompilationError),

    #[error("Invalid metadata file {}", path.display())]
    Sidecar {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    #[error("{failed} of {total} pages failed to compile")]
    BuildFailed { failed: usize, total: usize },

    #[error("{0}")]
    Validation(String),
}

/// Errors that caused `err`, outermost first.
pub(crate) fn causes<'a>(
    err: &'a (dyn Error + 'static),
) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    std::iter::successors(err.source(), |&e: &&'a (dyn Error + 'static)| e.source())
}

#[cfg(test)]
mod tests {
    use docket_compiler::CompileFailure;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_causes_walks_source_chain() {
        let err = CliError::Compilation(CompilationError {
            source_path: PathBuf::from("start.markdown"),
            cause: CompileFailure::TitleFormat("Start : Here".to_owned()),
        });
        let messages: Vec<String> = causes(&err).map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec!["Please remove space before the colon in the title 'Start : Here'"]
        );
        assert_eq!(err.to_string(), "Could not compile 'start.markdown'");
    }
}
