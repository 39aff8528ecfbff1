//! CLI error types.

use md2conf_config::ConfigError;
use md2conf_publish::PublishError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Publish(#[from] PublishError),

    #[error("{failed} of {total} documents failed to publish")]
    Failed { failed: usize, total: usize },
}
