//! `md2conf publish` command implementation.

use std::path::PathBuf;

use clap::Args;
use md2conf_config::{CliSettings, Config};
use md2conf_confluence::ConfluenceClient;
use md2conf_publish::{
    ExclusionSet, Progress, PublishAction, PublishOptions, PublishReport, PublishTarget,
    Publisher, plan,
};
use tracing::info;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Root directory to publish (default: `publish.root` or the config directory).
    pub(crate) root: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover md2conf.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Confluence space key (overrides config and `CONFLUENCE_SPACE`).
    #[arg(long)]
    pub(crate) space: Option<String>,

    /// Parent page ID for new pages (overrides config and `CONFLUENCE_PARENT_PAGE`).
    #[arg(long)]
    pub(crate) parent_page: Option<String>,

    /// Look pages up without creating or updating anything.
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Continue after a document fails and report a tally at the end.
    #[arg(long)]
    pub(crate) keep_going: bool,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is incomplete, discovery fails or
    /// any document fails to publish.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            root: self.root,
            space: self.space,
            parent_page_id: self.parent_page,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        // Fail on missing credentials before touching the tree
        let confluence = config.require_confluence()?;

        let settings = &config.publish_resolved;
        let documents = plan(&settings.root, &ExclusionSet::from_config(settings))?;
        if documents.is_empty() {
            info!(root = %settings.root.display(), "No documents to publish");
            output.info("No markdown files found; exiting ...");
            return Ok(());
        }

        let client = ConfluenceClient::new(
            &confluence.base_url,
            &confluence.username,
            &confluence.api_token,
        );
        let target = PublishTarget {
            space: confluence.space,
            parent_id: confluence.parent_page_id,
        };
        let options = PublishOptions {
            dry_run: self.dry_run,
            keep_going: self.keep_going,
        };

        if options.dry_run {
            output.highlight("[DRY RUN] No changes will be made.");
        }
        output.info(&format!(
            "Publishing {} documents from {} to space {}",
            documents.len(),
            settings.root.display(),
            target.space
        ));

        let publisher = Publisher::new(client, target).with_options(options);
        let report = publisher.run(&documents, |progress| match progress {
            Progress::Published(outcome) => output.success(&outcome.to_string()),
            Progress::Failed(failure) => output.warning(&format!(
                "Failed: {} ({}): {}",
                failure.title,
                failure.relative_path.display(),
                failure.error
            )),
        })?;

        output.info(&summary(&report));

        if report.is_success() {
            Ok(())
        } else {
            Err(CliError::Failed {
                failed: report.failures.len(),
                total: report.total(),
            })
        }
    }
}

fn summary(report: &PublishReport) -> String {
    let mut parts = Vec::new();
    for (action, label) in [
        (PublishAction::Created, "created"),
        (PublishAction::Updated, "updated"),
        (PublishAction::WouldCreate, "would create"),
        (PublishAction::WouldUpdate, "would update"),
    ] {
        let count = report.count(action);
        if count > 0 {
            parts.push(format!("{count} {label}"));
        }
    }
    if !report.failures.is_empty() {
        parts.push(format!("{} failed", report.failures.len()));
    }
    format!("\nDone: {}", parts.join(", "))
}
