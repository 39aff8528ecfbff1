//! Path-derived page titles.
//!
//! A title is the document's path relative to the root, without its final
//! extension, with components joined by `/` on every platform:
//!
//! - `README.md` -> `README`
//! - `docs/guide.md` -> `docs/guide`
//! - `docs\setup\install.md` (Windows) -> `docs/setup/install`

use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::discovery::Document;
use crate::error::PublishError;

/// Canonical page title, also used as the remote lookup key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Title(String);

impl Title {
    /// Derive the title of a root-relative document path.
    #[must_use]
    pub fn from_relative(relative: &Path) -> Self {
        let stem = relative.with_extension("");
        let segments: Vec<_> = stem
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy()),
                _ => None,
            })
            .collect();
        Self(segments.join("/"))
    }

    /// Derive the title of `path`, which must live under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::OutsideRoot`] if `path` is not below `root`.
    pub fn for_path(root: &Path, path: &Path) -> Result<Self, PublishError> {
        let relative = path
            .strip_prefix(root)
            .map_err(|_| PublishError::OutsideRoot {
                path: path.to_path_buf(),
                root: root.to_path_buf(),
            })?;
        Ok(Self::from_relative(relative))
    }

    /// The title text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A discovered document paired with its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedDocument {
    /// Page title.
    pub title: Title,
    /// Source document.
    pub document: Document,
}

/// Assign titles to `documents`, preserving their order.
///
/// Confluence treats titles within a space as case-insensitively unique, so
/// two documents whose titles differ only by case are rejected here rather
/// than silently overwriting each other remotely.
///
/// # Errors
///
/// Returns [`PublishError::TitleCollision`] on the first clash and
/// [`PublishError::OutsideRoot`] if a document is not under `root`.
pub fn map_titles(
    root: &Path,
    documents: Vec<Document>,
) -> Result<Vec<MappedDocument>, PublishError> {
    let mut seen: HashMap<String, PathBuf> = HashMap::with_capacity(documents.len());
    let mut mapped = Vec::with_capacity(documents.len());

    for document in documents {
        let title = Title::for_path(root, document.path())?;
        let key = title.as_str().to_lowercase();

        if let Some(first) = seen.get(&key) {
            return Err(PublishError::TitleCollision {
                title: title.0,
                first: first.clone(),
                second: document.relative_path().to_path_buf(),
            });
        }
        seen.insert(key, document.relative_path().to_path_buf());
        mapped.push(MappedDocument { title, document });
    }

    Ok(mapped)
}
