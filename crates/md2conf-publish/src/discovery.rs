//! Document discovery by filesystem walking.
//!
//! Discovery only identifies files; no content is read at this stage.
//! [`Document::read_content`] reads the text when the publisher needs it.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

use md2conf_config::{DEFAULT_EXAMPLE_SUFFIX, DEFAULT_EXCLUDE_DIRS, PublishConfig};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::PublishError;

/// Extension of publishable documents.
const MARKDOWN_EXTENSION: &str = "md";

/// Rules that prune documents during discovery.
///
/// A document is excluded iff some component of its root-relative path
/// equals one of `dirs`, or its lowercased filename ends with the example
/// suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    dirs: BTreeSet<String>,
    example_suffix: String,
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDE_DIRS.iter().copied(), DEFAULT_EXAMPLE_SUFFIX)
    }
}

impl ExclusionSet {
    /// Build an exclusion set. The suffix is matched case-insensitively.
    pub fn new<I, S>(dirs: I, example_suffix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            example_suffix: example_suffix.to_lowercase(),
        }
    }

    /// Build from resolved publish configuration.
    #[must_use]
    pub fn from_config(config: &PublishConfig) -> Self {
        Self::new(config.exclude_dirs.iter().cloned(), &config.example_suffix)
    }

    /// Whether a document at `relative` (relative to the root) is excluded.
    #[must_use]
    pub fn excludes(&self, relative: &Path) -> bool {
        let segment_hit = relative.components().any(|c| match c {
            Component::Normal(name) => self.excludes_segment(name),
            _ => false,
        });
        segment_hit || relative.file_name().is_some_and(|name| self.is_example(name))
    }

    fn excludes_segment(&self, name: &OsStr) -> bool {
        name.to_str().is_some_and(|n| self.dirs.contains(n))
    }

    fn is_example(&self, file_name: &OsStr) -> bool {
        file_name
            .to_string_lossy()
            .to_lowercase()
            .ends_with(&self.example_suffix)
    }
}

/// A Markdown file found under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    relative_path: PathBuf,
}

impl Document {
    /// Absolute (root-joined) path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the discovery root.
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Read the document text as UTF-8.
    pub fn read_content(&self) -> Result<String, PublishError> {
        fs::read_to_string(&self.path).map_err(|source| PublishError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

/// Find all publishable documents under `root`, sorted by relative path.
///
/// Excluded directories are not descended into. An empty result is not an
/// error.
///
/// # Errors
///
/// Returns [`PublishError::RootNotFound`] if `root` is not a directory and
/// [`PublishError::Walk`] if any directory cannot be read.
pub fn discover(root: &Path, exclusions: &ExclusionSet) -> Result<Vec<Document>, PublishError> {
    if !root.is_dir() {
        return Err(PublishError::RootNotFound(root.to_path_buf()));
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir() && exclusions.excludes_segment(entry.file_name()))
        });

    let mut documents = Vec::new();
    for entry in walker {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type().is_dir() || !path.is_file() {
            continue;
        }
        // A file named just `.md` has no stem and therefore no title
        if path.extension() != Some(OsStr::new(MARKDOWN_EXTENSION)) {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .map_err(|_| PublishError::OutsideRoot {
                path: path.to_path_buf(),
                root: root.to_path_buf(),
            })?;

        if exclusions.excludes(relative) {
            debug!("Skipping excluded document {}", relative.display());
            continue;
        }

        documents.push(Document {
            path: path.to_path_buf(),
            relative_path: relative.to_path_buf(),
        });
    }

    documents.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    debug!("Discovered {} documents under {}", documents.len(), root.display());
    Ok(documents)
}
