//! Page store abstraction.
//!
//! [`PageStore`] is the narrow surface the publisher needs from Confluence:
//! one lookup and two writes. [`ConfluenceClient`](crate::ConfluenceClient)
//! implements it over HTTP; `MockPageStore` (feature `mock`) implements it in
//! memory for tests.

use crate::error::ConfluenceError;
use crate::types::RemotePage;

/// Read and write access to pages in a Confluence space.
pub trait PageStore {
    /// Find a page by exact title within `space`.
    ///
    /// Returns `Ok(None)` when no page carries that title.
    fn find_page_by_title(
        &self,
        space: &str,
        title: &str,
    ) -> Result<Option<RemotePage>, ConfluenceError>;

    /// Create a page in `space` nested under `parent_id`.
    fn create_page(
        &self,
        space: &str,
        title: &str,
        body: &str,
        parent_id: &str,
    ) -> Result<RemotePage, ConfluenceError>;

    /// Replace the title and body of an existing page.
    ///
    /// `current_version` is the version the caller last saw; the new version
    /// is `current_version + 1`. The body is replaced wholesale.
    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        current_version: u32,
    ) -> Result<RemotePage, ConfluenceError>;
}

impl<S: PageStore + ?Sized> PageStore for &S {
    fn find_page_by_title(
        &self,
        space: &str,
        title: &str,
    ) -> Result<Option<RemotePage>, ConfluenceError> {
        (**self).find_page_by_title(space, title)
    }

    fn create_page(
        &self,
        space: &str,
        title: &str,
        body: &str,
        parent_id: &str,
    ) -> Result<RemotePage, ConfluenceError> {
        (**self).create_page(space, title, body, parent_id)
    }

    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        current_version: u32,
    ) -> Result<RemotePage, ConfluenceError> {
        (**self).update_page(page_id, title, body, current_version)
    }
}
