//! Image resolution.
//!
//! The renderer leaves a placeholder for every markdown image. This pass
//! checks each referenced file exists next to the page, records it for the
//! asset pipeline and writes the final `<img>` tag with the public URL.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::path::{Path, PathBuf};

use docket_renderer::directive::Replacements;
use docket_renderer::{ImageDirective, escape_html};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};

use crate::error::CompileFailure;
use crate::model::{DocVersion, DocumentationImage, Language};

/// Template used when none is configured.
pub const DEFAULT_URL_TEMPLATE: &str = "/attachments/{version}/{key}/{file}";

/// RFC 3986 unreserved characters stay as they are.
const URL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const IMAGES_PREFIX: &str = "images/";

/// Public URL naming for page images.
pub trait ImageUrlPolicy: Send + Sync {
    /// URL of `file_name`, an image of page `key`.
    fn image_url(
        &self,
        version: &DocVersion,
        language: &Language,
        key: &str,
        file_name: &str,
    ) -> String;
}

/// URL policy filling `{version}`, `{language}`, `{key}` and `{file}` in a
/// template.
///
/// Values are percent-encoded; the `/` between key segments is kept.
///
/// ```
/// use docket_compiler::{DocVersion, ImageUrlPolicy, Language, TemplateImageUrls};
///
/// let urls = TemplateImageUrls::default();
/// let url = urls.image_url(
///     &DocVersion::from("5.1"),
///     &Language::new("csharp"),
///     "indexes/map reduce",
///     "studio.png",
/// );
/// assert_eq!(url, "/attachments/5.1/indexes/map%20reduce/studio.png");
/// ```
#[derive(Clone, Debug)]
pub struct TemplateImageUrls {
    template: String,
}

impl TemplateImageUrls {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Default for TemplateImageUrls {
    fn default() -> Self {
        Self::new(DEFAULT_URL_TEMPLATE)
    }
}

impl ImageUrlPolicy for TemplateImageUrls {
    fn image_url(
        &self,
        version: &DocVersion,
        language: &Language,
        key: &str,
        file_name: &str,
    ) -> String {
        let key = key
            .split('/')
            .map(encode)
            .collect::<Vec<_>>()
            .join("/");
        self.template
            .replace("{version}", &encode(version.as_str()))
            .replace("{language}", &encode(language.as_str()))
            .replace("{key}", &key)
            .replace("{file}", &encode(file_name))
    }
}

fn encode(value: &str) -> String {
    percent_encode(value.as_bytes(), URL_ENCODE_SET).to_string()
}

/// Resolves the images of one page.
pub(crate) struct ImageResolver<'a> {
    pub(crate) urls: &'a dyn ImageUrlPolicy,
    pub(crate) class: &'a str,
    pub(crate) version: &'a DocVersion,
    pub(crate) language: &'a Language,
    /// Page key, used in URLs and error messages.
    pub(crate) key: &'a str,
    /// Directory of the page source.
    pub(crate) directory: &'a Path,
}

impl ImageResolver<'_> {
    /// Replace every image placeholder in `html` with its `<img>` tag and
    /// return the referenced files.
    pub(crate) fn resolve(
        &self,
        html: &mut String,
        images: &[ImageDirective],
    ) -> Result<BTreeSet<DocumentationImage>, CompileFailure> {
        let mut sources: BTreeMap<String, PathBuf> = BTreeMap::new();
        let mut replacements = Replacements::with_capacity(images.len());

        for image in images {
            let (src, recorded) = if image.src.is_empty() {
                (None, None)
            } else {
                let (url, recorded) = self.prepare(&image.src)?;
                (Some(url), Some(recorded))
            };

            if let Some(recorded) = recorded {
                let canonical = canonical(&recorded.path);
                match sources.get(&recorded.key) {
                    Some(existing) if *existing != canonical => {
                        return Err(CompileFailure::ConflictingImageKey {
                            image_key: recorded.key,
                            first: existing.clone(),
                            second: canonical,
                        });
                    }
                    Some(_) => {}
                    None => {
                        sources.insert(recorded.key, canonical);
                    }
                }
            }

            replacements.add(image.placeholder(), self.tag(src.as_deref(), image));
        }

        replacements.apply(html);
        Ok(sources
            .into_iter()
            .map(|(key, path)| DocumentationImage { key, path })
            .collect())
    }

    fn prepare(&self, reference: &str) -> Result<(String, DocumentationImage), CompileFailure> {
        let reference = reference.replace('\\', "/");
        let path = self.directory.join(&reference);
        if !path.is_file() {
            return Err(CompileFailure::MissingImage {
                path,
                key: self.key.to_owned(),
            });
        }
        if reference.starts_with('.') {
            return Err(CompileFailure::InvalidImagePath {
                src: reference,
                key: self.key.to_owned(),
            });
        }

        let stripped = strip_images_prefix(&reference);
        let file_name = stripped.rsplit('/').next().unwrap_or(stripped);
        let url = self
            .urls
            .image_url(self.version, self.language, self.key, file_name);
        let image = DocumentationImage {
            key: format!("{}/{stripped}", self.version),
            path,
        };
        Ok((url, image))
    }

    fn tag(&self, src: Option<&str>, image: &ImageDirective) -> String {
        let mut tag = String::from("<img");
        if let Some(src) = src {
            write!(tag, r#" src="{}""#, escape_html(src)).unwrap();
        }
        write!(tag, r#" class="{}""#, escape_html(self.class)).unwrap();
        if !image.title.is_empty() {
            write!(tag, r#" title="{}""#, escape_html(&image.title)).unwrap();
        }
        write!(tag, r#" alt="{}">"#, escape_html(&image.alt)).unwrap();
        tag
    }
}

fn strip_images_prefix(reference: &str) -> &str {
    match reference.get(..IMAGES_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(IMAGES_PREFIX) => {
            &reference[IMAGES_PREFIX.len()..]
        }
        _ => reference,
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use pretty_assertions::assert_eq;

    fn directive(index: usize, src: &str) -> ImageDirective {
        ImageDirective {
            index,
            src: src.to_owned(),
            alt: "Studio".to_owned(),
            title: String::new(),
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        version: DocVersion,
        language: Language,
        urls: TemplateImageUrls,
    }

    impl Fixture {
        fn new(files: &[&str]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            for file in files {
                let path = dir.path().join(file);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, b"png").unwrap();
            }
            Self {
                dir,
                version: DocVersion::from("5.1"),
                language: Language::new("csharp"),
                urls: TemplateImageUrls::default(),
            }
        }

        fn resolver(&self) -> ImageResolver<'_> {
            ImageResolver {
                urls: &self.urls,
                class: "img-responsive img-thumbnail",
                version: &self.version,
                language: &self.language,
                key: "studio/overview",
                directory: self.dir.path(),
            }
        }
    }

    #[test]
    fn test_template_urls() {
        let urls = TemplateImageUrls::new("https://cdn/{language}/{version}/{key}/{file}");
        assert_eq!(
            urls.image_url(
                &DocVersion::from("4.2"),
                &Language::new("java"),
                "start/a&b",
                "my image.png"
            ),
            "https://cdn/java/4.2/start/a%26b/my%20image.png"
        );
    }

    #[test]
    fn test_images_prefix_is_stripped_case_insensitively() {
        assert_eq!(strip_images_prefix("images/a.png"), "a.png");
        assert_eq!(strip_images_prefix("Images/sub/a.png"), "sub/a.png");
        assert_eq!(strip_images_prefix("img/a.png"), "img/a.png");
        assert_eq!(strip_images_prefix("imag"), "imag");
    }

    #[test]
    fn test_resolve_writes_tag_and_records_image() {
        let fixture = Fixture::new(&["images/studio.png"]);
        let image = directive(0, "images/studio.png");
        let mut html = format!("<p>{}</p>", image.placeholder());

        let images = fixture.resolver().resolve(&mut html, &[image]).unwrap();

        assert_eq!(
            html,
            "<p><img src=\"/attachments/5.1/studio/overview/studio.png\" \
             class=\"img-responsive img-thumbnail\" alt=\"Studio\"></p>"
        );
        let recorded: Vec<&str> = images.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(recorded, vec!["5.1/studio.png"]);
    }

    #[test]
    fn test_backslash_reference() {
        let fixture = Fixture::new(&["images/sub/a.png"]);
        let image = directive(0, r"Images\sub\a.png");
        let mut html = image.placeholder();
        let images = fixture.resolver().resolve(&mut html, &[image]).unwrap();
        assert!(html.contains("/attachments/5.1/studio/overview/a.png"));
        assert_eq!(images.first().map(|i| i.key.as_str()), Some("5.1/sub/a.png"));
    }

    #[test]
    fn test_same_image_twice_is_recorded_once() {
        let fixture = Fixture::new(&["images/a.png"]);
        let images = [directive(0, "images/a.png"), directive(1, "images/a.png")];
        let mut html = format!("{}{}", images[0].placeholder(), images[1].placeholder());
        let recorded = fixture.resolver().resolve(&mut html, &images).unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(html.matches("<img").count(), 2);
    }

    #[test]
    fn test_conflicting_image_key() {
        let fixture = Fixture::new(&["images/a.png", "a.png"]);
        let images = [directive(0, "images/a.png"), directive(1, "a.png")];
        let mut html = String::new();
        let err = fixture.resolver().resolve(&mut html, &images).unwrap_err();
        let CompileFailure::ConflictingImageKey { image_key, .. } = err else {
            panic!("expected conflicting key, got {err}");
        };
        assert_eq!(image_key, "5.1/a.png");
    }

    #[test]
    fn test_missing_image() {
        let fixture = Fixture::new(&[]);
        let mut html = String::new();
        let err = fixture
            .resolver()
            .resolve(&mut html, &[directive(0, "images/none.png")])
            .unwrap_err();
        assert!(matches!(err, CompileFailure::MissingImage { .. }));
        assert!(err.to_string().ends_with("for article 'studio/overview'"));
    }

    #[test]
    fn test_dot_reference_is_rejected() {
        let fixture = Fixture::new(&["images/a.png"]);
        let nested = fixture.dir.path().join("page");
        fs::create_dir(&nested).unwrap();
        let resolver = ImageResolver {
            directory: &nested,
            ..fixture.resolver()
        };
        let mut html = String::new();
        let err = resolver
            .resolve(&mut html, &[directive(0, "../images/a.png")])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid image path '../images/a.png' in article 'studio/overview'. \
             It cannot start from dot ('.')"
        );
    }

    #[test]
    fn test_image_without_src_is_not_recorded() {
        let fixture = Fixture::new(&[]);
        let mut image = directive(0, "");
        image.title = "Empty".to_owned();
        let mut html = image.placeholder();
        let images = fixture.resolver().resolve(&mut html, &[image]).unwrap();
        assert!(images.is_empty());
        assert_eq!(
            html,
            "<img class=\"img-responsive img-thumbnail\" title=\"Empty\" alt=\"Studio\">"
        );
    }
}
