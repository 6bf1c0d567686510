//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod compile;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use docket_compiler::{CompilerOptions, DocumentCompiler, TemplateImageUrls};
use docket_config::{CliSettings, Config};
use docket_vcs::GitRepository;

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use compile::CompileArgs;

/// Options shared by all commands.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover docket.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation root directory (overrides config).
    #[arg(long, env = "DOCKET_DOCS_ROOT")]
    docs_root: Option<PathBuf>,

    /// Directory to discover the git repository from (overrides config).
    #[arg(long)]
    repository: Option<PathBuf>,

    /// Image URL template (overrides config).
    #[arg(long)]
    image_url_template: Option<String>,
}

impl ConfigArgs {
    fn load(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            docs_root: self.docs_root.clone(),
            repository_root: self.repository.clone(),
            image_url_template: self.image_url_template.clone(),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Compiler options described by `config`.
pub(crate) fn compiler_options(config: &Config) -> CompilerOptions {
    let docs = &config.docs_resolved;
    let mut options = CompilerOptions::new(&docs.root)
        .with_pages_dir(&docs.pages_dir)
        .with_image_class(&config.images.css_class);
    for (name, language) in &config.languages {
        if let Some(suffix) = &language.file_suffix {
            options = options.with_file_suffix(name, suffix);
        }
        if let Some(dir) = &language.samples_dir {
            let fence = language.fence.as_deref().unwrap_or(name);
            options = options.with_samples(name, dir, fence);
        }
    }
    options
}

/// Compiler for `config`, reading history from its git repository.
pub(crate) fn create_compiler(config: &Config) -> Result<DocumentCompiler, CliError> {
    let repository = GitRepository::discover(&config.docs_resolved.repository_root)?;
    let compiler = DocumentCompiler::new(compiler_options(config), Arc::new(repository))
        .with_url_policy(TemplateImageUrls::new(&config.images.url_template));
    Ok(compiler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compiler_options_from_default_config() {
        let config = Config::default();
        let options = compiler_options(&config);
        assert_eq!(options.pages_dir, "Raven.Documentation.Pages");
        assert_eq!(options.image_class, "img-responsive img-thumbnail");
        assert_eq!(options.file_suffixes.get("csharp").map(String::as_str), Some(".dotnet"));
        let samples = &options.builder.samples["nodejs"];
        assert_eq!(samples.dir, "Samples/nodejs");
        assert_eq!(samples.fence, "javascript");
    }
}
