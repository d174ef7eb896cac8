//! `sitemap-gen generate` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use sitemap_config::{CliSettings, Config};
use sitemap_core::{RunOutcome, SitemapBuilder, SitemapPublisher, SitemapSettings};
use sitemap_store_sqlite::SqliteStore;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Path to configuration file (default: auto-discover sitemap.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Production base URL of the portal (overrides config).
    #[arg(long, env = "SITEMAP_BASE_URL")]
    base_url: Option<String>,

    /// Portal database URL (overrides config).
    #[arg(long, env = "SITEMAP_DATABASE_URL")]
    database_url: Option<String>,

    /// Output file (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output (log traversal progress).
    #[arg(short, long)]
    pub verbose: bool,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the database cannot be opened
    /// or the publication run fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            base_url: self.base_url,
            database_url: self.database_url,
            output: self.output,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(config_path = ?config.config_path, "Configuration loaded");

        output.setting("Database", &config.database.url);
        output.setting("Base URL", &config.site.base_url);

        let outcome = generate(&config)?;
        output.outcome(&outcome, &config.output_path);

        Ok(())
    }
}

/// Run one publication for a loaded configuration.
fn generate(config: &Config) -> Result<RunOutcome, CliError> {
    let store = Arc::new(SqliteStore::connect(&config.database.url)?);
    let builder = SitemapBuilder::new(
        Arc::<SqliteStore>::clone(&store),
        store,
        SitemapSettings::from_config(config),
    );
    let mut publisher = SitemapPublisher::new(builder, config.output_path.clone());

    let outcome = publisher.run();
    if outcome.success {
        Ok(outcome)
    } else {
        Err(CliError::Generate(outcome.message))
    }
}
