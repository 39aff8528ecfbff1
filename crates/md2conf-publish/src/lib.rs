//! Markdown tree publishing for md2conf.
//!
//! Publishing runs in three stages:
//!
//! 1. [`discover`] walks the root and returns the publishable documents,
//!    sorted by relative path.
//! 2. [`map_titles`] derives one page title per document from its path.
//! 3. [`Publisher`] converts each document and creates or updates its page
//!    through any [`PageStore`](md2conf_confluence::PageStore).
//!
//! [`plan`] runs the first two stages together.

mod discovery;
mod error;
mod publisher;
mod title;

use std::path::Path;

pub use discovery::{Document, ExclusionSet, discover};
pub use error::PublishError;
pub use publisher::{
    PageFailure, PageOutcome, Progress, PublishAction, PublishOptions, PublishReport,
    PublishTarget, Publisher,
};
pub use title::{MappedDocument, Title, map_titles};

/// Discover documents under `root` and assign their titles.
///
/// # Errors
///
/// Returns any discovery or title-mapping error.
pub fn plan(root: &Path, exclusions: &ExclusionSet) -> Result<Vec<MappedDocument>, PublishError> {
    let documents = discover(root, exclusions)?;
    map_titles(root, documents)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use md2conf_confluence::{MockPageStore, PageStore, StoreCall, markdown_to_storage};
    use pretty_assertions::assert_eq;

    use super::*;

    fn target() -> PublishTarget {
        PublishTarget {
            space: "DOCS".to_owned(),
            parent_id: "123".to_owned(),
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn worked_example() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "docs/guide.md", "# Guide\n\nRead me.\n");
        write(dir.path(), "docs/guide.example.md", "# Example\n");
        write(dir.path(), ".git/ignored.md", "# Ignored\n");
        write(dir.path(), "README.md", "# Project\n");
        dir
    }

    fn collect_lines(
        publisher: &Publisher<&MockPageStore>,
        docs: &[MappedDocument],
    ) -> (PublishReport, Vec<String>) {
        let mut lines = Vec::new();
        let report = publisher
            .run(docs, |progress| match progress {
                Progress::Published(outcome) => lines.push(outcome.to_string()),
                Progress::Failed(failure) => lines.push(format!("Failed: {}", failure.title)),
            })
            .unwrap();
        (report, lines)
    }

    #[test]
    fn test_worked_example_creates_two_pages() {
        let dir = worked_example();
        let docs = plan(dir.path(), &ExclusionSet::default()).unwrap();
        let store = MockPageStore::new();
        let publisher = Publisher::new(&store, target());

        let (report, lines) = collect_lines(&publisher, &docs);

        assert_eq!(
            lines,
            vec![
                "Created page: README (1000)".to_owned(),
                "Created page: docs/guide (1001)".to_owned(),
            ]
        );
        assert_eq!(report.count(PublishAction::Created), 2);
        for call in store.calls() {
            if let StoreCall::Create { parent_id, .. } = call {
                assert_eq!(parent_id, "123");
            }
        }
    }

    #[test]
    fn test_second_run_updates_in_place() {
        let dir = worked_example();
        let docs = plan(dir.path(), &ExclusionSet::default()).unwrap();
        let store = MockPageStore::new();
        let publisher = Publisher::new(&store, target());

        collect_lines(&publisher, &docs);
        let (report, lines) = collect_lines(&publisher, &docs);

        assert_eq!(
            lines,
            vec![
                "Updated existing page: README (1000)".to_owned(),
                "Updated existing page: docs/guide (1001)".to_owned(),
            ]
        );
        assert_eq!(report.count(PublishAction::Created), 0);

        let pages = store.pages("DOCS");
        assert_eq!(pages.len(), 2);
        let guide = pages.iter().find(|p| p.title == "docs/guide").unwrap();
        assert_eq!(guide.version.number, 2);
        assert_eq!(
            guide.storage_value(),
            Some(markdown_to_storage("# Guide\n\nRead me.\n").as_str())
        );
    }

    #[test]
    fn test_existing_page_is_never_recreated() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "README.md", "new text");
        let store = MockPageStore::new().with_page("DOCS", "README", "<p>old</p>");
        let docs = plan(dir.path(), &ExclusionSet::default()).unwrap();

        let report = Publisher::new(&store, target())
            .run(&docs, |_| {})
            .unwrap();

        assert_eq!(report.outcomes[0].page_id.as_deref(), Some("1000"));
        assert!(
            store
                .calls()
                .iter()
                .all(|c| !matches!(c, StoreCall::Create { .. }))
        );
        assert_eq!(store.pages("DOCS")[0].storage_value(), Some("<p>new text</p>"));
    }

    #[test]
    fn test_empty_tree_makes_no_calls() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.example.md", "");
        let docs = plan(dir.path(), &ExclusionSet::default()).unwrap();
        assert!(docs.is_empty());

        let store = MockPageStore::new();
        let report = Publisher::new(&store, target()).run(&docs, |_| {}).unwrap();
        assert_eq!(report.total(), 0);
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_fail_fast_stops_at_first_error() {
        let dir = tempfile::tempdir().unwrap();
        for rel in ["a.md", "b.md", "c.md"] {
            write(dir.path(), rel, "x");
        }
        let docs = plan(dir.path(), &ExclusionSet::default()).unwrap();
        let store = MockPageStore::new().fail_writes_for("b");

        let err = Publisher::new(&store, target())
            .run(&docs, |_| {})
            .unwrap_err();

        assert!(matches!(err, PublishError::Remote { ref title, .. } if title == "b"));
        let touched: Vec<_> = store
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                StoreCall::Find { title, .. } => Some(title),
                _ => None,
            })
            .collect();
        assert_eq!(touched, vec!["a".to_owned(), "b".to_owned()]);
        assert!(store.find_page_by_title("DOCS", "c").unwrap().is_none());
    }

    #[test]
    fn test_keep_going_tallies_failures() {
        let dir = tempfile::tempdir().unwrap();
        for rel in ["a.md", "b.md", "c.md"] {
            write(dir.path(), rel, "x");
        }
        let docs = plan(dir.path(), &ExclusionSet::default()).unwrap();
        let store = MockPageStore::new().fail_writes_for("b");
        let publisher = Publisher::new(&store, target()).with_options(PublishOptions {
            keep_going: true,
            ..PublishOptions::default()
        });

        let (report, lines) = collect_lines(&publisher, &docs);

        assert_eq!(
            lines,
            vec![
                "Created page: a (1000)".to_owned(),
                "Failed: b".to_owned(),
                "Created page: c (1001)".to_owned(),
            ]
        );
        assert_eq!(report.total(), 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].relative_path, Path::new("b.md"));
        assert!(!report.is_success());
    }

    #[test]
    fn test_dry_run_reports_plan_without_writes() {
        let dir = worked_example();
        let docs = plan(dir.path(), &ExclusionSet::default()).unwrap();
        let store = MockPageStore::new().with_page("DOCS", "README", "");
        let publisher = Publisher::new(&store, target()).with_options(PublishOptions {
            dry_run: true,
            ..PublishOptions::default()
        });

        let (_, lines) = collect_lines(&publisher, &docs);

        assert_eq!(
            lines,
            vec![
                "Would update existing page: README (1000)".to_owned(),
                "Would create page: docs/guide".to_owned(),
            ]
        );
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_plan_rejects_missing_root() {
        let err = plan(Path::new("/nonexistent/md2conf-root"), &ExclusionSet::default())
            .unwrap_err();
        assert!(matches!(err, PublishError::RootNotFound(_)));
    }
}
