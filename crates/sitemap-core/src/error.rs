//! Sitemap build errors.

use sitemap_store::StoreError;

/// Error returned when a sitemap build fails.
///
/// Every variant aborts the whole build; no partial document is produced.
#[derive(Debug, thiserror::Error)]
pub enum SitemapError {
    /// The root page does not exist.
    #[error("Page not found: {0}")]
    PageNotFound(i32),
    /// A repository query failed.
    #[error("Repository error: {0}")]
    Store(#[from] StoreError),
    /// A modification timestamp is too short to hold a `YYYY-MM-DD` date.
    #[error("Invalid modification date: {0:?}")]
    InvalidDate(String),
    /// The XML writer failed.
    #[error("XML write error: {0}")]
    Xml(String),
}
