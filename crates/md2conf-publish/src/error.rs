//! Publishing error types.

use std::io;
use std::path::PathBuf;

use md2conf_confluence::ConfluenceError;

/// Error raised while discovering, mapping or publishing documents.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Root directory is missing or not a directory.
    #[error("Source directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// Directory traversal failed (permission denied, vanished entry).
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// Document content could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// Document path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A path handed to title mapping does not live under the root.
    #[error("{} is not inside {}", .path.display(), .root.display())]
    OutsideRoot {
        /// Offending path.
        path: PathBuf,
        /// Root it was expected under.
        root: PathBuf,
    },

    /// Two documents map to the same page title.
    #[error(
        "Title collision: {} and {} both map to '{title}'",
        .first.display(),
        .second.display()
    )]
    TitleCollision {
        /// Title shared by both documents (as derived from `second`).
        title: String,
        /// Path that claimed the title first.
        first: PathBuf,
        /// Path that collided with it.
        second: PathBuf,
    },

    /// A Confluence call failed.
    #[error("Failed to publish '{title}': {source}")]
    Remote {
        /// Title of the page being published.
        title: String,
        /// Underlying API error.
        #[source]
        source: ConfluenceError,
    },
}
