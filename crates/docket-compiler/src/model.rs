//! Inputs and outputs of a compilation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Client language a page is written for (`csharp`, `java`, ...).
///
/// Always lowercase.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Language(String);

impl Language {
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Language {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for Language {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Documentation version such as `4.2` or `5.1`.
///
/// Ordered component-wise: numeric components compare as numbers
/// (`4.2 < 5.0 < 10.0`), anything else compares as text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocVersion(String);

impl DocVersion {
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for DocVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.0.split('.');
        let mut right = other.0.split('.');
        loop {
            let ordering = match (left.next(), right.next()) {
                (None, None) => return self.0.cmp(&other.0),
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(a), Some(b)) => match (a.parse::<u64>(), b.parse::<u64>()) {
                    (Ok(a), Ok(b)) => a.cmp(&b),
                    _ => a.cmp(b),
                },
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
    }
}

impl PartialOrd for DocVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for DocVersion {
    fn from(version: &str) -> Self {
        Self::new(version)
    }
}

impl fmt::Display for DocVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Top-level section of the documentation, the first segment of a page key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        Self(key.split('/').next().unwrap_or_default().to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A documentation source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
}

impl SourceFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory image references are resolved against.
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn read(&self) -> io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}

/// Catalog entry describing one logical document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FolderItem {
    pub language: Language,
    pub metadata: BTreeMap<String, String>,
    pub seo: BTreeMap<String, String>,
    pub discussion_id: Option<String>,
}

impl Default for Language {
    fn default() -> Self {
        Self::new("csharp")
    }
}

impl FolderItem {
    #[must_use]
    pub fn new(language: impl Into<Language>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_seo(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.seo.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_discussion_id(mut self, id: impl Into<String>) -> Self {
        self.discussion_id = Some(id.into());
        self
    }
}

/// The same page in another documentation version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationMapping {
    pub version: DocVersion,
    pub key: String,
}

/// Image referenced by a page.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationImage {
    /// Cache key: `<version>/<reference without images/ prefix>`.
    pub key: String,
    /// File on disk.
    pub path: PathBuf,
}

/// Where a file sits in the repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryData {
    /// `None` for files never committed.
    pub last_commit_sha: Option<String>,
    /// `/`-separated path relative to the repository root.
    pub relative_path: String,
}

/// Everything one [`compile`](crate::DocumentCompiler::compile) call needs.
#[derive(Clone, Debug)]
pub struct CompilationParameters {
    pub file: SourceFile,
    pub folder_item: FolderItem,
    /// Version the page is compiled for.
    pub version: DocVersion,
    /// Version whose samples legacy code references point at.
    pub source_version: DocVersion,
    pub mappings: Vec<DocumentationMapping>,
}

impl CompilationParameters {
    /// Parameters with the source version equal to `version` and no mappings.
    #[must_use]
    pub fn new(file: SourceFile, folder_item: FolderItem, version: DocVersion) -> Self {
        Self {
            file,
            folder_item,
            source_version: version.clone(),
            version,
            mappings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_source_version(mut self, version: DocVersion) -> Self {
        self.source_version = version;
        self
    }

    #[must_use]
    pub fn with_mappings(mut self, mappings: Vec<DocumentationMapping>) -> Self {
        self.mappings = mappings;
        self
    }
}

/// Fields gathered by the compiler, handed to the page constructor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageFields {
    pub key: String,
    pub title: String,
    pub version: DocVersion,
    pub html: String,
    pub text: String,
    pub language: Language,
    pub category: Category,
    pub images: BTreeSet<DocumentationImage>,
    pub last_commit_sha: Option<String>,
    pub relative_path: String,
    /// Sorted by version.
    pub mappings: Vec<DocumentationMapping>,
    pub metadata: BTreeMap<String, String>,
    pub seo: BTreeMap<String, String>,
    pub related_articles_html: String,
    pub discussion_id: Option<String>,
}

/// A compiled documentation page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationPage {
    pub key: String,
    pub title: String,
    pub version: DocVersion,
    pub html_content: String,
    pub text_content: String,
    pub language: Language,
    pub category: Category,
    pub images: BTreeSet<DocumentationImage>,
    pub last_commit_sha: Option<String>,
    pub relative_path: String,
    pub mappings: Vec<DocumentationMapping>,
    pub metadata: BTreeMap<String, String>,
    pub seo_meta_properties: BTreeMap<String, String>,
    pub related_articles_content: String,
    pub discussion_id: Option<String>,
}

impl From<PageFields> for DocumentationPage {
    fn from(fields: PageFields) -> Self {
        Self {
            key: fields.key,
            title: fields.title,
            version: fields.version,
            html_content: fields.html,
            text_content: fields.text,
            language: fields.language,
            category: fields.category,
            images: fields.images,
            last_commit_sha: fields.last_commit_sha,
            relative_path: fields.relative_path,
            mappings: fields.mappings,
            metadata: fields.metadata,
            seo_meta_properties: fields.seo,
            related_articles_content: fields.related_articles_html,
            discussion_id: fields.discussion_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_version_ordering() {
        let mut versions: Vec<DocVersion> = ["10.0", "4.2", "5.0", "4.10", "5.0-beta", "5"]
            .into_iter()
            .map(DocVersion::from)
            .collect();
        versions.sort();
        let sorted: Vec<&str> = versions.iter().map(DocVersion::as_str).collect();
        assert_eq!(sorted, vec!["4.2", "4.10", "5", "5.0", "5.0-beta", "10.0"]);
    }

    #[test]
    fn test_version_ordering_is_consistent_with_eq() {
        let a = DocVersion::from("5.0");
        let b = DocVersion::from("5.00");
        assert_ne!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn test_language_is_lowercase() {
        assert_eq!(Language::new(" CSharp ").as_str(), "csharp");
        let language: Language = serde_json::from_str("\"Java\"").unwrap();
        assert_eq!(language, Language::new("java"));
        assert_eq!(serde_json::to_string(&language).unwrap(), "\"java\"");
    }

    #[test]
    fn test_category_from_key() {
        assert_eq!(Category::from_key("indexes/map-reduce").as_str(), "indexes");
        assert_eq!(Category::from_key("start").as_str(), "start");
    }

    #[test]
    fn test_source_file_parts() {
        let file = SourceFile::new("/docs/5.1/Pages/indexes/map-reduce.markdown");
        assert_eq!(file.directory(), Path::new("/docs/5.1/Pages/indexes"));
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = DocumentationPage::from(PageFields {
            key: "start".to_owned(),
            title: "Start".to_owned(),
            version: DocVersion::from("5.1"),
            html: "<h1>Start</h1>".to_owned(),
            text: "Start".to_owned(),
            language: Language::new("csharp"),
            category: Category::from_key("start"),
            images: BTreeSet::new(),
            last_commit_sha: None,
            relative_path: "Documentation/5.1/Pages/start.markdown".to_owned(),
            mappings: Vec::new(),
            metadata: BTreeMap::new(),
            seo: BTreeMap::new(),
            related_articles_html: String::new(),
            discussion_id: None,
        });
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["htmlContent"], "<h1>Start</h1>");
        assert_eq!(json["seoMetaProperties"], serde_json::json!({}));
        assert_eq!(json["lastCommitSha"], serde_json::Value::Null);
        assert_eq!(json["category"], "start");
    }
}
