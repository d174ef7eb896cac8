//! Sitemap publication run.
//!
//! [`SitemapPublisher`] is what a scheduler invokes: build, write to the output
//! file, remember how it went. A failed run never touches the existing file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::builder::SitemapBuilder;
use crate::error::SitemapError;
use crate::xml::render_urlset;

/// Last-run message after a successful run.
const SUCCESS_MESSAGE: &str = "Site Map successfully generated.";

/// Error from a single publication attempt.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The sitemap could not be built.
    #[error("{0}")]
    Build(#[from] SitemapError),
    /// The sitemap could not be written.
    #[error("Error writing file {}: {source}", path.display())]
    Io {
        /// Output file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Result of one run, as reported to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Whether the file was written.
    pub success: bool,
    /// Human-readable last-run message.
    pub message: String,
    /// Number of `<url>` entries written (0 on failure).
    pub url_count: usize,
}

/// Builds the sitemap and persists it to a file.
pub struct SitemapPublisher {
    builder: SitemapBuilder,
    output_path: PathBuf,
    last_run_logs: Option<String>,
}

impl SitemapPublisher {
    /// Create a publisher writing to `output_path`.
    #[must_use]
    pub fn new(builder: SitemapBuilder, output_path: impl Into<PathBuf>) -> Self {
        Self {
            builder,
            output_path: output_path.into(),
            last_run_logs: None,
        }
    }

    /// Message recorded by the most recent [`run`](Self::run), if any.
    #[must_use]
    pub fn last_run_logs(&self) -> Option<&str> {
        self.last_run_logs.as_deref()
    }

    /// Run one publication and record its outcome.
    ///
    /// Errors are logged and turned into the last-run message; they are never
    /// propagated.
    pub fn run(&mut self) -> RunOutcome {
        let outcome = match self.publish() {
            Ok(url_count) => {
                tracing::info!(
                    path = %self.output_path.display(),
                    url_count,
                    "Site map generated"
                );
                RunOutcome {
                    success: true,
                    message: SUCCESS_MESSAGE.to_owned(),
                    url_count,
                }
            }
            Err(e) => {
                tracing::error!(
                    path = %self.output_path.display(),
                    error = %e,
                    "Site map generation failed"
                );
                RunOutcome {
                    success: false,
                    message: format!("Site Map generation failed. Error : {e}"),
                    url_count: 0,
                }
            }
        };

        self.last_run_logs = Some(outcome.message.clone());
        outcome
    }

    /// Build the sitemap and write it, returning the number of entries.
    ///
    /// The document is written to a temporary file next to the target and
    /// renamed over it, so readers never see a partial file.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] if the build or the write fails. On error the
    /// previous output file is left as it was.
    pub fn publish(&self) -> Result<usize, PublishError> {
        let entries = self.builder.collect()?;
        let xml = render_urlset(&entries)?;

        write_atomically(&self.output_path, xml.as_bytes()).map_err(|source| PublishError::Io {
            path: self.output_path.clone(),
            source,
        })?;

        Ok(entries.len())
    }
}

fn write_atomically(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new(""));
    fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(content)?;
    file.flush()?;

    // NamedTempFile is created 0600; the sitemap is meant to be served.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))?;
    }

    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
