//! Per-page metadata files.
//!
//! A page `start.markdown` may have a `start.meta.yaml` next to it:
//!
//! ```yaml
//! metadata:
//!   description: First steps
//! seo:
//!   og:type: article
//! discussion_id: "1234"
//! mappings:
//!   - version: "4.2"
//!     key: start/getting-started
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use docket_compiler::{DocumentationMapping, FolderItem, Language};
use serde::Deserialize;

use crate::error::CliError;

const SIDECAR_SUFFIX: &str = ".meta.yaml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Sidecar {
    metadata: BTreeMap<String, String>,
    seo: BTreeMap<String, String>,
    discussion_id: Option<String>,
    mappings: Vec<DocumentationMapping>,
}

/// Catalog data of one page.
#[derive(Debug)]
pub(crate) struct PageEntry {
    pub(crate) folder_item: FolderItem,
    pub(crate) mappings: Vec<DocumentationMapping>,
}

/// Metadata file belonging to `page`.
pub(crate) fn sidecar_path(page: &Path) -> PathBuf {
    let stem = page
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    page.with_file_name(format!("{stem}{SIDECAR_SUFFIX}"))
}

/// Load the catalog entry of `page`; pages without a metadata file get an
/// empty one.
pub(crate) fn load_entry(page: &Path, language: &Language) -> Result<PageEntry, CliError> {
    let path = sidecar_path(page);
    let sidecar = match std::fs::read_to_string(&path) {
        Ok(content) => serde_yaml::from_str::<Option<Sidecar>>(&content)
            .map_err(|source| CliError::Sidecar {
                path: path.clone(),
                source,
            })?
            .unwrap_or_default(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Sidecar::default(),
        Err(e) => return Err(e.into()),
    };

    tracing::debug!(page = %page.display(), sidecar = path.exists(), "Loaded page entry");

    let mut folder_item = FolderItem::new(language.clone());
    folder_item.metadata = sidecar.metadata;
    folder_item.seo = sidecar.seo;
    folder_item.discussion_id = sidecar.discussion_id;

    Ok(PageEntry {
        folder_item,
        mappings: sidecar.mappings,
    })
}
