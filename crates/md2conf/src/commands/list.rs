//! `md2conf list` command implementation.

use std::path::PathBuf;

use clap::Args;
use md2conf_config::{CliSettings, Config};
use md2conf_publish::{ExclusionSet, plan};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Root directory to scan (default: `publish.root` or the config directory).
    pub(crate) root: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover md2conf.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,
}

impl ListArgs {
    /// Execute the list command. Needs no Confluence settings.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or discovery fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            root: self.root,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let settings = &config.publish_resolved;

        let documents = plan(&settings.root, &ExclusionSet::from_config(settings))?;
        if documents.is_empty() {
            output.info("No markdown files found; exiting ...");
            return Ok(());
        }

        for mapped in &documents {
            output.plain(&format!(
                "{}  {}",
                mapped.title,
                mapped.document.relative_path().display()
            ));
        }
        output.info(&format!("{} documents", documents.len()));
        Ok(())
    }
}
