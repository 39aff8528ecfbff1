//! In-memory page store for testing.
//!
//! Provides [`MockPageStore`] for exercising publishing logic without a
//! Confluence server.

use std::collections::HashSet;
use std::sync::RwLock;

use crate::error::ConfluenceError;
use crate::store::PageStore;
use crate::types::{Body, RemotePage, Storage, Version};

/// A call made against [`MockPageStore`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `find_page_by_title`.
    Find {
        /// Space key.
        space: String,
        /// Looked-up title.
        title: String,
    },
    /// `create_page`.
    Create {
        /// Space key.
        space: String,
        /// New page title.
        title: String,
        /// Parent page ID.
        parent_id: String,
    },
    /// `update_page`.
    Update {
        /// Updated page ID.
        page_id: String,
        /// Title sent with the update.
        title: String,
        /// Version the caller claimed to update from.
        current_version: u32,
    },
}

/// Mock page store.
///
/// Pages live in memory and get sequential numeric IDs starting at 1000.
/// Writes to titles registered with [`MockPageStore::fail_writes_for`] return
/// an HTTP 500 error.
///
/// # Example
///
/// ```ignore
/// use md2conf_confluence::{MockPageStore, PageStore};
///
/// let store = MockPageStore::new().with_page("DOCS", "README", "<p>old</p>");
/// let page = store.find_page_by_title("DOCS", "README")?.unwrap();
/// store.update_page(&page.id, "README", "<p>new</p>", page.version.number)?;
/// ```
#[derive(Debug, Default)]
pub struct MockPageStore {
    pages: RwLock<Vec<(String, RemotePage)>>,
    calls: RwLock<Vec<StoreCall>>,
    failing: RwLock<HashSet<String>>,
}

impl MockPageStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing page in `space`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, space: &str, title: &str, body: &str) -> Self {
        let page = self.new_page(title, body, 1);
        self.pages.write().unwrap().push((space.to_owned(), page));
        self
    }

    /// Make every create or update of `title` fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn fail_writes_for(self, title: &str) -> Self {
        self.failing.write().unwrap().insert(title.to_owned());
        self
    }

    /// All calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of create and update calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn write_count(&self) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| !matches!(c, StoreCall::Find { .. }))
            .count()
    }

    /// Snapshot of all pages in `space`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn pages(&self, space: &str) -> Vec<RemotePage> {
        self.pages
            .read()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == space)
            .map(|(_, p)| p.clone())
            .collect()
    }

    fn new_page(&self, title: &str, body: &str, version: u32) -> RemotePage {
        let id = 1000 + self.pages.read().unwrap().len();
        RemotePage {
            id: id.to_string(),
            title: title.to_owned(),
            version: Version { number: version },
            body: Some(Body {
                storage: Some(Storage {
                    value: body.to_owned(),
                    representation: "storage".to_owned(),
                }),
            }),
        }
    }

    fn record(&self, call: StoreCall) {
        self.calls.write().unwrap().push(call);
    }

    fn check_failure(&self, title: &str) -> Result<(), ConfluenceError> {
        if self.failing.read().unwrap().contains(title) {
            return Err(ConfluenceError::from_status(
                500,
                format!("simulated failure for {title}"),
            ));
        }
        Ok(())
    }
}

impl PageStore for MockPageStore {
    fn find_page_by_title(
        &self,
        space: &str,
        title: &str,
    ) -> Result<Option<RemotePage>, ConfluenceError> {
        self.record(StoreCall::Find {
            space: space.to_owned(),
            title: title.to_owned(),
        });
        let pages = self.pages.read().unwrap();
        Ok(pages
            .iter()
            .find(|(s, p)| s == space && p.title == title)
            .map(|(_, p)| p.clone()))
    }

    fn create_page(
        &self,
        space: &str,
        title: &str,
        body: &str,
        parent_id: &str,
    ) -> Result<RemotePage, ConfluenceError> {
        self.record(StoreCall::Create {
            space: space.to_owned(),
            title: title.to_owned(),
            parent_id: parent_id.to_owned(),
        });
        self.check_failure(title)?;

        let exists = self
            .pages
            .read()
            .unwrap()
            .iter()
            .any(|(s, p)| s == space && p.title == title);
        if exists {
            return Err(ConfluenceError::from_status(
                400,
                format!("A page with this title already exists: {title}"),
            ));
        }

        let page = self.new_page(title, body, 1);
        self.pages
            .write()
            .unwrap()
            .push((space.to_owned(), page.clone()));
        Ok(page)
    }

    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        current_version: u32,
    ) -> Result<RemotePage, ConfluenceError> {
        self.record(StoreCall::Update {
            page_id: page_id.to_owned(),
            title: title.to_owned(),
            current_version,
        });
        self.check_failure(title)?;

        let mut pages = self.pages.write().unwrap();
        let Some((_, page)) = pages.iter_mut().find(|(_, p)| p.id == page_id) else {
            return Err(ConfluenceError::from_status(
                404,
                format!("No content found with id {page_id}"),
            ));
        };
        if page.version.number != current_version {
            return Err(ConfluenceError::from_status(
                409,
                format!("Version must be incremented on update. Current: {}", page.version.number),
            ));
        }

        page.title = title.to_owned();
        page.version.number += 1;
        page.body = Some(Body {
            storage: Some(Storage {
                value: body.to_owned(),
                representation: "storage".to_owned(),
            }),
        });
        Ok(page.clone())
    }
}
