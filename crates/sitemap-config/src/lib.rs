//! Configuration management for the portal sitemap generator.
//!
//! Parses `sitemap.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Example
//!
//! ```toml
//! [site]
//! base_url = "https://portal.example.com"
//!
//! [sitemap]
//! root_page_id = 1
//! page_changefreq = "weekly"
//! document_changefreq = "monthly"
//! output = "public/sitemap.xml"
//!
//! [database]
//! url = "sqlite://portal.db"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.base_url`
//! - `database.url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the production base URL.
    pub base_url: Option<String>,
    /// Override the database connection URL.
    pub database_url: Option<String>,
    /// Override the output file path.
    pub output: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "sitemap.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Public site configuration.
    pub site: SiteConfig,
    /// Sitemap generation configuration.
    pub sitemap: SitemapConfig,
    /// Database configuration.
    pub database: DatabaseConfig,

    /// Resolved output file path (set after loading).
    #[serde(skip)]
    pub output_path: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Public site configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Production base URL prefixed to every `<loc>` (no trailing slash).
    pub base_url: String,
}

/// Sitemap generation configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Page the traversal starts from.
    pub root_page_id: i32,
    /// Change frequency advertised for every page.
    pub page_changefreq: ChangeFrequency,
    /// Change frequency advertised for every document.
    pub document_changefreq: ChangeFrequency,
    /// Output file, relative to the config file directory.
    pub output: String,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            root_page_id: 1,
            page_changefreq: ChangeFrequency::Weekly,
            document_changefreq: ChangeFrequency::Monthly,
            output: "sitemap.xml".to_owned(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL (e.g. `sqlite://portal.db`).
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://portal.db".to_owned(),
        }
    }
}

/// Sitemap protocol `<changefreq>` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    /// Protocol token as written in the sitemap.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl std::fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.base_url`").
        field: String,
        /// Error message (e.g., "${`PORTAL_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `sitemap.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, and the
    /// result is validated last so that a CLI `--base-url` can stand in for a
    /// missing `[site]` section.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.normalize();
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_url) = &settings.base_url {
            self.site.base_url.clone_from(base_url);
        }
        if let Some(database_url) = &settings.database_url {
            self.database.url.clone_from(database_url);
        }
        if let Some(output) = &settings.output {
            self.output_path.clone_from(output);
        }
    }

    /// Strip trailing slashes from the base URL.
    fn normalize(&mut self) {
        let trimmed = self.site.base_url.trim_end_matches('/');
        if trimmed.len() != self.site.base_url.len() {
            self.site.base_url = trimmed.to_owned();
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.base_url, "site.base_url")?;
        require_http_url(&self.site.base_url, "site.base_url")?;
        require_non_empty(&self.database.url, "database.url")?;

        if self.sitemap.root_page_id <= 0 {
            return Err(ConfigError::Validation(
                "sitemap.root_page_id must be greater than 0".to_owned(),
            ));
        }

        require_non_empty(&self.sitemap.output, "sitemap.output")?;

        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let sitemap = SitemapConfig::default();
        let output_path = base.join(&sitemap.output);
        Self {
            site: SiteConfig::default(),
            sitemap,
            database: DatabaseConfig::default(),
            output_path,
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.base_url = expand::expand_env(&self.site.base_url, "site.base_url")?;
        self.database.url = expand::expand_env(&self.database.url, "database.url")?;
        Ok(())
    }

    /// Resolve the output path relative to the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.output_path = config_dir.join(&self.sitemap.output);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default_with_base(Path::new("/srv/portal"));
        config.site.base_url = "https://portal.example.com".to_owned();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.site.base_url, "");
        assert_eq!(config.sitemap.root_page_id, 1);
        assert_eq!(config.sitemap.page_changefreq, ChangeFrequency::Weekly);
        assert_eq!(config.sitemap.document_changefreq, ChangeFrequency::Monthly);
        assert_eq!(config.database.url, "sqlite://portal.db");
        assert_eq!(config.output_path, PathBuf::from("/test/sitemap.xml"));
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.sitemap.root_page_id, 1);
        assert_eq!(config.sitemap.output, "sitemap.xml");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[site]
base_url = "https://portal.example.com"

[sitemap]
root_page_id = 3
page_changefreq = "daily"
document_changefreq = "never"
output = "public/sitemap.xml"

[database]
url = "sqlite:///var/lib/portal.db"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.site.base_url, "https://portal.example.com");
        assert_eq!(config.sitemap.root_page_id, 3);
        assert_eq!(config.sitemap.page_changefreq, ChangeFrequency::Daily);
        assert_eq!(config.sitemap.document_changefreq, ChangeFrequency::Never);
        assert_eq!(config.sitemap.output, "public/sitemap.xml");
        assert_eq!(config.database.url, "sqlite:///var/lib/portal.db");
    }

    #[test]
    fn test_parse_unknown_changefreq_fails() {
        let toml = r#"
[sitemap]
page_changefreq = "sometimes"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("sometimes"));
    }

    #[test]
    fn test_change_frequency_tokens() {
        let all = [
            (ChangeFrequency::Always, "always"),
            (ChangeFrequency::Hourly, "hourly"),
            (ChangeFrequency::Daily, "daily"),
            (ChangeFrequency::Weekly, "weekly"),
            (ChangeFrequency::Monthly, "monthly"),
            (ChangeFrequency::Yearly, "yearly"),
            (ChangeFrequency::Never, "never"),
        ];
        for (freq, token) in all {
            assert_eq!(freq.to_string(), token);
        }
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[sitemap]
output = "public/sitemap.xml"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.output_path,
            PathBuf::from("/project/public/sitemap.xml")
        );
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = valid_config();
        let overrides = CliSettings {
            base_url: Some("https://staging.example.com".to_owned()),
            database_url: Some("sqlite://staging.db".to_owned()),
            output: Some(PathBuf::from("/tmp/sitemap.xml")),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.site.base_url, "https://staging.example.com");
        assert_eq!(config.database.url, "sqlite://staging.db");
        assert_eq!(config.output_path, PathBuf::from("/tmp/sitemap.xml"));
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = valid_config();

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.site.base_url, "https://portal.example.com");
        assert_eq!(config.database.url, "sqlite://portal.db");
        assert_eq!(
            config.output_path,
            PathBuf::from("/srv/portal/sitemap.xml")
        );
    }

    #[test]
    fn test_normalize_trims_trailing_slash() {
        let mut config = valid_config();
        config.site.base_url = "https://portal.example.com//".to_owned();

        config.normalize();

        assert_eq!(config.site.base_url, "https://portal.example.com");
    }

    #[test]
    fn test_validate_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_base_url_empty() {
        let config = Config::default_with_base(Path::new("/test"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("site.base_url cannot be empty"));
    }

    #[test]
    fn test_validate_base_url_invalid_scheme() {
        let mut config = valid_config();
        config.site.base_url = "ftp://portal.example.com".to_owned();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_validate_root_page_id_zero() {
        let mut config = valid_config();
        config.sitemap.root_page_id = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("root_page_id"));
    }

    #[test]
    fn test_validate_database_url_empty() {
        let mut config = valid_config();
        config.database.url = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("database.url"));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/sitemap.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file_resolves_output_and_expands_env() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SITEMAP_TEST_PORTAL_HOST", "portal.example.org");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitemap.toml");
        std::fs::write(
            &path,
            r#"
[site]
base_url = "https://${SITEMAP_TEST_PORTAL_HOST}/"

[sitemap]
output = "out/sitemap.xml"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        unsafe {
            std::env::remove_var("SITEMAP_TEST_PORTAL_HOST");
        }

        assert_eq!(config.site.base_url, "https://portal.example.org");
        assert_eq!(config.output_path, dir.path().join("out/sitemap.xml"));
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_cli_base_url_fills_missing_site_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitemap.toml");
        std::fs::write(&path, "[sitemap]\nroot_page_id = 2\n").unwrap();
        let settings = CliSettings {
            base_url: Some("http://localhost:8080/portal".to_owned()),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.site.base_url, "http://localhost:8080/portal");
        assert_eq!(config.sitemap.root_page_id, 2);
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitemap.toml");
        std::fs::write(&path, "[site\nbase_url = ").unwrap();

        let result = Config::load(Some(&path), None);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
