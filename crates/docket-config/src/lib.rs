//! Configuration management for Docket.
//!
//! Parses `docket.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Layout
//!
//! Documentation is organised per version:
//!
//! ```text
//! <docs.root>/<version>/<docs.pages_dir>/...   markdown pages
//! <docs.root>/<version>/<samples_dir>/...      code samples for a language
//! ```
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `docs.root`
//! - `repository.root`
//! - `images.url_template`

mod expand;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override documentation root directory.
    pub docs_root: Option<PathBuf>,
    /// Override the directory the git repository is discovered from.
    pub repository_root: Option<PathBuf>,
    /// Override the image URL template.
    pub image_url_template: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docket.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Image rewriting configuration.
    pub images: ImagesConfig,
    /// Per-language settings keyed by language name.
    ///
    /// Entries from the file extend and override the built-in table.
    pub languages: BTreeMap<String, LanguageConfig>,
    /// Repository configuration (paths are relative strings from TOML).
    repository: RepositoryConfigRaw,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    root: Option<String>,
    pages_dir: Option<String>,
    extensions: Option<Vec<String>>,
}

/// Raw repository configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RepositoryConfigRaw {
    root: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Clone, Default)]
pub struct DocsConfig {
    /// Directory holding one subdirectory per documentation version.
    pub root: PathBuf,
    /// Name of the pages directory inside a version directory.
    pub pages_dir: String,
    /// Source file extensions, without the leading dot.
    pub extensions: Vec<String>,
    /// Directory the git repository is discovered from.
    pub repository_root: PathBuf,
}

impl DocsConfig {
    /// Directory of a single documentation version.
    #[must_use]
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.root.join(version)
    }

    /// Pages directory of a documentation version.
    #[must_use]
    pub fn pages_path(&self, version: &str) -> PathBuf {
        self.version_dir(version).join(&self.pages_dir)
    }

    /// Whether `path` has one of the configured source extensions.
    #[must_use]
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(ext))
            })
    }
}

/// Image rewriting configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Public URL template.
    ///
    /// Placeholders: `{version}`, `{language}`, `{key}`, `{file}`.
    pub url_template: String,
    /// Class attribute applied to every rendered image.
    pub css_class: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            url_template: "/attachments/{version}/{key}/{file}".to_owned(),
            css_class: "img-responsive img-thumbnail".to_owned(),
        }
    }
}

/// Settings for a single documentation language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Filename suffix marking a page as language specific (e.g. `.dotnet`).
    pub file_suffix: Option<String>,
    /// Samples directory relative to the version directory.
    pub samples_dir: Option<String>,
    /// Info string used for fenced code samples.
    pub fence: Option<String>,
}

impl LanguageConfig {
    fn new(file_suffix: &str, samples_dir: &str, fence: &str) -> Self {
        Self {
            file_suffix: Some(file_suffix.to_owned()),
            samples_dir: Some(samples_dir.to_owned()),
            fence: Some(fence.to_owned()),
        }
    }
}

fn default_languages() -> BTreeMap<String, LanguageConfig> {
    [
        (
            "csharp",
            LanguageConfig::new(
                ".dotnet",
                "Samples/csharp/Raven.Documentation.Samples",
                "csharp",
            ),
        ),
        (
            "java",
            LanguageConfig::new(".java", "Samples/java/src/test/java", "java"),
        ),
        (
            "nodejs",
            LanguageConfig::new(".js", "Samples/nodejs", "javascript"),
        ),
        (
            "python",
            LanguageConfig::new(".python", "Samples/python", "python"),
        ),
        ("php", LanguageConfig::new(".php", "Samples/php", "php")),
        ("go", LanguageConfig::new(".go", "Samples/go", "go")),
    ]
    .into_iter()
    .map(|(name, config)| (name.to_owned(), config))
    .collect()
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`docs.root`").
        field: String,
        /// Error message (e.g., "${`DOCS_ROOT`} not set").
        message: String,
    },
}

/// `path` joined onto the working directory when it is relative.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `docket.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Settings for `language`, if it is configured.
    #[must_use]
    pub fn language(&self, language: &str) -> Option<&LanguageConfig> {
        self.languages.get(language)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(docs_root) = &settings.docs_root {
            self.docs_resolved.root = absolute(docs_root);
        }
        if let Some(repository_root) = &settings.repository_root {
            self.docs_resolved.repository_root = absolute(repository_root);
        }
        if let Some(template) = &settings.image_url_template {
            self.images.url_template.clone_from(template);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            images: ImagesConfig::default(),
            languages: default_languages(),
            repository: RepositoryConfigRaw::default(),
            docs_resolved: DocsConfig {
                root: base.join("Documentation"),
                pages_dir: "Raven.Documentation.Pages".to_owned(),
                extensions: vec!["markdown".to_owned(), "md".to_owned()],
                repository_root: base.to_path_buf(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_docs()?;
        self.validate_images()?;
        self.validate_languages()?;
        Ok(())
    }

    fn validate_docs(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.docs_resolved.pages_dir, "docs.pages_dir")?;

        if self.docs_resolved.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "docs.extensions must list at least one extension".to_owned(),
            ));
        }
        for ext in &self.docs_resolved.extensions {
            require_non_empty(ext, "docs.extensions")?;
        }

        Ok(())
    }

    fn validate_images(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.images.url_template, "images.url_template")?;

        if !self.images.url_template.contains("{file}") {
            return Err(ConfigError::Validation(
                "images.url_template must contain the {file} placeholder".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_languages(&self) -> Result<(), ConfigError> {
        for (name, language) in &self.languages {
            if let Some(suffix) = &language.file_suffix {
                require_non_empty(suffix, &format!("languages.{name}.file_suffix"))?;
            }
            if let Some(samples_dir) = &language.samples_dir {
                require_non_empty(samples_dir, &format!("languages.{name}.samples_dir"))?;
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref root) = self.docs.root {
            self.docs.root = Some(expand::expand_env(root, "docs.root")?);
        }
        if let Some(ref root) = self.repository.root {
            self.repository.root = Some(expand::expand_env(root, "repository.root")?);
        }
        self.images.url_template =
            expand::expand_env(&self.images.url_template, "images.url_template")?;

        Ok(())
    }

    /// Resolve relative paths against the config directory and fill in
    /// built-in language settings missing from the file.
    fn resolve(&mut self, config_dir: &Path) {
        let resolve =
            |path: Option<&str>, default: &str| absolute(&config_dir.join(path.unwrap_or(default)));

        let extensions = self
            .docs
            .extensions
            .iter()
            .flatten()
            .map(|ext| ext.trim_start_matches('.').to_owned())
            .collect::<Vec<_>>();

        self.docs_resolved = DocsConfig {
            root: resolve(self.docs.root.as_deref(), "Documentation"),
            pages_dir: self
                .docs
                .pages_dir
                .clone()
                .unwrap_or_else(|| "Raven.Documentation.Pages".to_owned()),
            extensions: if self.docs.extensions.is_some() {
                extensions
            } else {
                vec!["markdown".to_owned(), "md".to_owned()]
            },
            repository_root: resolve(self.repository.root.as_deref(), "."),
        };

        for (name, language) in default_languages() {
            self.languages.entry(name).or_insert(language);
        }
    }
}
