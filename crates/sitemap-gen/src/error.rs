//! CLI error types.

use sitemap_config::ConfigError;
use sitemap_store::StoreError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Store(#[from] StoreError),

    /// A publication run failed; carries the last-run message.
    #[error("{0}")]
    Generate(String),
}

impl CliError {
    /// Line shown to the user before exiting.
    ///
    /// A failed run already reads as a complete sentence, so it is shown as is.
    pub(crate) fn report(&self) -> String {
        match self {
            Self::Generate(message) => message.clone(),
            other => format!("Error: {other}"),
        }
    }
}
