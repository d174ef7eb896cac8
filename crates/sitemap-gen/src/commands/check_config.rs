//! `sitemap-gen check-config` command implementation.

use std::path::PathBuf;

use clap::Args;
use sitemap_config::Config;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check-config command.
#[derive(Args)]
pub(crate) struct CheckConfigArgs {
    /// Path to configuration file (default: auto-discover sitemap.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl CheckConfigArgs {
    /// Execute the check-config command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;

        output.heading("Configuration is valid");
        for (key, value) in describe(&config) {
            output.setting(key, &value);
        }

        Ok(())
    }
}

/// Resolved settings as `(key, value)` pairs, in file order.
fn describe(config: &Config) -> Vec<(&'static str, String)> {
    let source = config.config_path.as_ref().map_or_else(
        || "(defaults)".to_owned(),
        |p| p.display().to_string(),
    );

    vec![
        ("config", source),
        ("site.base_url", config.site.base_url.clone()),
        ("sitemap.root_page_id", config.sitemap.root_page_id.to_string()),
        ("sitemap.page_changefreq", config.sitemap.page_changefreq.to_string()),
        (
            "sitemap.document_changefreq",
            config.sitemap.document_changefreq.to_string(),
        ),
        ("sitemap.output", config.output_path.display().to_string()),
        ("database.url", config.database.url.clone()),
    ]
}
