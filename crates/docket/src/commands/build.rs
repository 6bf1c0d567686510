//! `docket build` command implementation.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use docket_compiler::{
    CompilationParameters, DocVersion, DocumentCompiler, DocumentationPage, Language, SourceFile,
};
use docket_config::{Config, DocsConfig};
use glob::Pattern;
use rayon::prelude::*;

use super::{ConfigArgs, create_compiler};
use crate::error::{CliError, causes};
use crate::output::Output;
use crate::sidecar::load_entry;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Documentation version to build.
    #[arg(long)]
    doc_version: String,

    /// Client language the pages are compiled for.
    #[arg(short, long, default_value = "csharp")]
    language: String,

    /// Version legacy code references point at (default: --doc-version).
    #[arg(long)]
    source_version: Option<String>,

    /// Output directory for page JSON files (default: output/<version>/<language>).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

/// One compiled or failed source file.
struct Outcome {
    file: PathBuf,
    result: Result<PathBuf, CliError>,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// Every page is attempted; the command fails if any page failed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;
        let compiler = create_compiler(&config)?;

        let pages_dir = config.docs_resolved.pages_path(&self.doc_version);
        if !pages_dir.is_dir() {
            return Err(CliError::Validation(format!(
                "Pages directory not found: {}",
                pages_dir.display()
            )));
        }
        let output_dir = self.output_dir.unwrap_or_else(|| {
            PathBuf::from("output")
                .join(&self.doc_version)
                .join(&self.language)
        });

        output.info(&format!("Source: {}", pages_dir.display()));
        output.info(&format!("Output: {}", output_dir.display()));

        let foreign = foreign_suffixes(&config, &self.language);
        let files = find_sources(&pages_dir, &config.docs_resolved, &foreign)?;
        let job = BuildJob {
            compiler: &compiler,
            version: DocVersion::new(&self.doc_version),
            source_version: DocVersion::new(
                self.source_version.as_deref().unwrap_or(&self.doc_version),
            ),
            language: Language::new(&self.language),
            output_dir: &output_dir,
        };

        let start = Instant::now();
        let outcomes: Vec<Outcome> = files
            .into_par_iter()
            .map(|file| {
                let result = job.compile(&file);
                Outcome { file, result }
            })
            .collect();

        let total = outcomes.len();
        let mut failed = 0;
        for outcome in &outcomes {
            if let Err(err) = &outcome.result {
                failed += 1;
                output.error(&format!("{}: {err}", outcome.file.display()));
                for cause in causes(err) {
                    output.error(&format!("  caused by: {cause}"));
                }
            }
        }

        tracing::info!(
            pages = total,
            failed,
            elapsed_ms = start.elapsed().as_millis(),
            "Build finished"
        );

        if failed > 0 {
            output.warning(&format!("{} of {total} pages compiled", total - failed));
            return Err(CliError::BuildFailed { failed, total });
        }
        output.success(&format!("Compiled {total} pages"));
        Ok(())
    }
}

struct BuildJob<'a> {
    compiler: &'a DocumentCompiler,
    version: DocVersion,
    source_version: DocVersion,
    language: Language,
    output_dir: &'a Path,
}

impl BuildJob<'_> {
    /// Compile `file` and write its page, returning the written path.
    fn compile(&self, file: &Path) -> Result<PathBuf, CliError> {
        let entry = load_entry(file, &self.language)?;
        let params = CompilationParameters::new(
            SourceFile::new(file),
            entry.folder_item,
            self.version.clone(),
        )
        .with_source_version(self.source_version.clone())
        .with_mappings(entry.mappings);
        let page = self.compiler.compile(params)?;
        self.write(&page)
    }

    fn write(&self, page: &DocumentationPage) -> Result<PathBuf, CliError> {
        let path = self.output_dir.join(format!("{}.json", page.key));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_vec_pretty(page)?)?;
        tracing::debug!(key = %page.key, path = %path.display(), "Wrote page");
        Ok(path)
    }
}

/// File suffixes marking pages written for a language other than `language`.
///
/// Suffixes that `language`'s own suffix ends with are left out, so its
/// pages are never mistaken for another language's.
fn foreign_suffixes<'a>(config: &'a Config, language: &str) -> Vec<&'a str> {
    let own = config
        .language(language)
        .and_then(|settings| settings.file_suffix.as_deref());
    config
        .languages
        .iter()
        .filter(|(name, _)| name.as_str() != language)
        .filter_map(|(_, settings)| settings.file_suffix.as_deref())
        .filter(|suffix| own.is_none_or(|own| !own.ends_with(suffix)))
        .collect()
}

/// Source files under `dir`, sorted.
///
/// Files without a configured source extension and files whose stem ends
/// with one of `foreign` are skipped.
fn find_sources(
    dir: &Path,
    docs: &DocsConfig,
    foreign: &[&str],
) -> Result<Vec<PathBuf>, CliError> {
    let pattern = format!("{}/**/*", Pattern::escape(&dir.to_string_lossy()));
    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(glob::GlobError::into_error)?;
        if path.is_file() && docs.is_source_file(&path) && !has_suffix(&path, foreign) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn has_suffix(path: &Path, suffixes: &[&str]) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| suffixes.iter().any(|suffix| stem.ends_with(suffix)))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_sources() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("indexes/images")).unwrap();
        fs::write(root.join("start.markdown"), "").unwrap();
        fs::write(root.join("indexes/map-reduce.dotnet.markdown"), "").unwrap();
        fs::write(root.join("indexes/notes.MD"), "").unwrap();
        fs::write(root.join("indexes/map-reduce.dotnet.meta.yaml"), "").unwrap();
        fs::write(root.join("indexes/images/a.png"), "").unwrap();

        let config = Config::default();
        let files = find_sources(root, &config.docs_resolved, &[]).unwrap();
        let relative: Vec<PathBuf> = files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("indexes/map-reduce.dotnet.markdown"),
                PathBuf::from("indexes/notes.MD"),
                PathBuf::from("start.markdown"),
            ]
        );
    }

    #[test]
    fn test_other_language_pages_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("start.dotnet.markdown"), "").unwrap();
        fs::write(root.join("start.java.markdown"), "").unwrap();
        fs::write(root.join("start.js.markdown"), "").unwrap();
        fs::write(root.join("what-is-new.markdown"), "").unwrap();

        let config = Config::default();
        let foreign = foreign_suffixes(&config, "csharp");
        let files = find_sources(root, &config.docs_resolved, &foreign).unwrap();
        let names: Vec<&str> = files
            .iter()
            .filter_map(|f| f.file_name()?.to_str())
            .collect();
        assert_eq!(names, vec!["start.dotnet.markdown", "what-is-new.markdown"]);

        let foreign = foreign_suffixes(&config, "java");
        let files = find_sources(root, &config.docs_resolved, &foreign).unwrap();
        let names: Vec<&str> = files
            .iter()
            .filter_map(|f| f.file_name()?.to_str())
            .collect();
        assert_eq!(names, vec!["start.java.markdown", "what-is-new.markdown"]);
    }

    #[test]
    fn test_foreign_suffixes_keep_own_suffix() {
        let config = Config::default();
        let foreign = foreign_suffixes(&config, "csharp");
        assert!(foreign.contains(&".java"));
        assert!(!foreign.contains(&".dotnet"));
    }
}
