//! Create-or-update publishing.
//!
//! For every document the [`Publisher`] makes exactly one lookup by title and
//! then exactly one write: an update of the page it found, or a create under
//! the configured parent page. Updates replace the stored body outright.

use std::fmt;
use std::path::PathBuf;

use md2conf_confluence::{ConfluenceError, PageStore, markdown_to_storage};
use tracing::{info, warn};

use crate::error::PublishError;
use crate::title::{MappedDocument, Title};

/// Where new and existing pages live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    /// Space key.
    pub space: String,
    /// Parent page of newly created pages.
    pub parent_id: String,
}

/// Run-wide switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Look pages up but skip every write.
    pub dry_run: bool,
    /// Record per-document failures and continue instead of stopping.
    pub keep_going: bool,
}

/// What happened to one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishAction {
    /// A new page was created.
    Created,
    /// An existing page was overwritten.
    Updated,
    /// Dry run: a page would be created.
    WouldCreate,
    /// Dry run: an existing page would be overwritten.
    WouldUpdate,
}

/// Result of publishing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    /// Page title.
    pub title: Title,
    /// Action taken.
    pub action: PublishAction,
    /// ID of the created or updated page; `None` only for `WouldCreate`.
    pub page_id: Option<String>,
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.page_id.as_deref().unwrap_or("-");
        match self.action {
            PublishAction::Created => write!(f, "Created page: {} ({id})", self.title),
            PublishAction::Updated => write!(f, "Updated existing page: {} ({id})", self.title),
            PublishAction::WouldCreate => write!(f, "Would create page: {}", self.title),
            PublishAction::WouldUpdate => {
                write!(f, "Would update existing page: {} ({id})", self.title)
            }
        }
    }
}

/// A document that failed in keep-going mode.
#[derive(Debug)]
pub struct PageFailure {
    /// Page title.
    pub title: Title,
    /// Source document, relative to the root.
    pub relative_path: PathBuf,
    /// What went wrong.
    pub error: PublishError,
}

/// Progress notification emitted once per document.
#[derive(Debug)]
pub enum Progress<'a> {
    /// Document published (or, in dry-run mode, planned).
    Published(&'a PageOutcome),
    /// Document failed and the run continues.
    Failed(&'a PageFailure),
}

/// Tally of a publishing run.
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Successful documents, in publish order.
    pub outcomes: Vec<PageOutcome>,
    /// Failed documents (keep-going mode only).
    pub failures: Vec<PageFailure>,
}

impl PublishReport {
    /// Number of pages with the given action.
    pub fn count(&self, action: PublishAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    /// Number of documents attempted.
    pub fn total(&self) -> usize {
        self.outcomes.len() + self.failures.len()
    }

    /// True when no document failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Publishes documents into one space through a [`PageStore`].
pub struct Publisher<S> {
    store: S,
    target: PublishTarget,
    options: PublishOptions,
}

impl<S: PageStore> Publisher<S> {
    /// Create a publisher with default options.
    pub fn new(store: S, target: PublishTarget) -> Self {
        Self {
            store,
            target,
            options: PublishOptions::default(),
        }
    }

    /// Replace the run options.
    #[must_use]
    pub fn with_options(mut self, options: PublishOptions) -> Self {
        self.options = options;
        self
    }

    /// Reconcile one page: update it if `title` exists in the space,
    /// otherwise create it under the parent page.
    pub fn publish_page(&self, title: &Title, body: &str) -> Result<PageOutcome, ConfluenceError> {
        let existing = self
            .store
            .find_page_by_title(&self.target.space, title.as_str())?;

        let (action, page_id) = match (existing, self.options.dry_run) {
            (Some(page), true) => (PublishAction::WouldUpdate, Some(page.id)),
            (None, true) => (PublishAction::WouldCreate, None),
            (Some(page), false) => {
                let updated =
                    self.store
                        .update_page(&page.id, title.as_str(), body, page.version.number)?;
                (PublishAction::Updated, Some(updated.id))
            }
            (None, false) => {
                let created = self.store.create_page(
                    &self.target.space,
                    title.as_str(),
                    body,
                    &self.target.parent_id,
                )?;
                (PublishAction::Created, Some(created.id))
            }
        };

        Ok(PageOutcome {
            title: title.clone(),
            action,
            page_id,
        })
    }

    /// Read, convert and publish one document.
    pub fn publish_document(&self, mapped: &MappedDocument) -> Result<PageOutcome, PublishError> {
        let markdown = mapped.document.read_content()?;
        let body = markdown_to_storage(&markdown);
        self.publish_page(&mapped.title, &body)
            .map_err(|source| PublishError::Remote {
                title: mapped.title.to_string(),
                source,
            })
    }

    /// Publish `documents` in order, reporting each result to `on_progress`.
    ///
    /// Without `keep_going` the first failure is returned and later documents
    /// are left untouched. With it, failures are collected in the report.
    pub fn run<F>(
        &self,
        documents: &[MappedDocument],
        mut on_progress: F,
    ) -> Result<PublishReport, PublishError>
    where
        F: FnMut(Progress<'_>),
    {
        let mut report = PublishReport::default();

        for mapped in documents {
            match self.publish_document(mapped) {
                Ok(outcome) => {
                    info!(title = %outcome.title, action = ?outcome.action, "Published");
                    on_progress(Progress::Published(&outcome));
                    report.outcomes.push(outcome);
                }
                Err(error) if self.options.keep_going => {
                    warn!(title = %mapped.title, "Publishing failed: {error}");
                    let failure = PageFailure {
                        title: mapped.title.clone(),
                        relative_path: mapped.document.relative_path().to_path_buf(),
                        error,
                    };
                    on_progress(Progress::Failed(&failure));
                    report.failures.push(failure);
                }
                Err(error) => return Err(error),
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use md2conf_confluence::{MockPageStore, StoreCall};
    use pretty_assertions::assert_eq;

    use super::*;

    fn target() -> PublishTarget {
        PublishTarget {
            space: "DOCS".to_owned(),
            parent_id: "42".to_owned(),
        }
    }

    fn title(s: &str) -> Title {
        Title::from_relative(std::path::Path::new(&format!("{s}.md")))
    }

    #[test]
    fn test_absent_title_is_created_under_parent() {
        let store = MockPageStore::new();
        let publisher = Publisher::new(&store, target());

        let outcome = publisher.publish_page(&title("README"), "<p>x</p>").unwrap();
        assert_eq!(outcome.action, PublishAction::Created);
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Find {
                    space: "DOCS".to_owned(),
                    title: "README".to_owned()
                },
                StoreCall::Create {
                    space: "DOCS".to_owned(),
                    title: "README".to_owned(),
                    parent_id: "42".to_owned()
                },
            ]
        );
        assert_eq!(outcome.to_string(), "Created page: README (1000)");
    }

    #[test]
    fn test_existing_title_is_updated_with_its_id() {
        let store = MockPageStore::new().with_page("DOCS", "docs/guide", "<p>old</p>");
        let publisher = Publisher::new(&store, target());

        let outcome = publisher
            .publish_page(&title("docs/guide"), "<p>new</p>")
            .unwrap();
        assert_eq!(outcome.action, PublishAction::Updated);
        assert_eq!(outcome.page_id.as_deref(), Some("1000"));
        assert_eq!(store.write_count(), 1);
        assert!(matches!(
            &store.calls()[1],
            StoreCall::Update { page_id, current_version: 1, .. } if page_id == "1000"
        ));
        assert_eq!(
            outcome.to_string(),
            "Updated existing page: docs/guide (1000)"
        );
        assert_eq!(
            store.pages("DOCS")[0].storage_value(),
            Some("<p>new</p>")
        );
    }

    #[test]
    fn test_dry_run_never_writes() {
        let store = MockPageStore::new().with_page("DOCS", "a", "");
        let publisher = Publisher::new(&store, target()).with_options(PublishOptions {
            dry_run: true,
            ..PublishOptions::default()
        });

        let update = publisher.publish_page(&title("a"), "x").unwrap();
        let create = publisher.publish_page(&title("b"), "x").unwrap();
        assert_eq!(update.action, PublishAction::WouldUpdate);
        assert_eq!(create.action, PublishAction::WouldCreate);
        assert_eq!(create.to_string(), "Would create page: b");
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_remote_failure_propagates() {
        let store = MockPageStore::new().fail_writes_for("README");
        let publisher = Publisher::new(&store, target());
        let err = publisher.publish_page(&title("README"), "x").unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_report_counts() {
        let report = PublishReport {
            outcomes: vec![
                PageOutcome {
                    title: title("a"),
                    action: PublishAction::Created,
                    page_id: Some("1".to_owned()),
                },
                PageOutcome {
                    title: title("b"),
                    action: PublishAction::Updated,
                    page_id: Some("2".to_owned()),
                },
            ],
            failures: Vec::new(),
        };
        assert_eq!(report.count(PublishAction::Created), 1);
        assert_eq!(report.count(PublishAction::Updated), 1);
        assert_eq!(report.total(), 2);
        assert!(report.is_success());
    }
}
