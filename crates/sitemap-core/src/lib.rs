//! Sitemap generation over the portal page tree.
//!
//! [`SitemapBuilder`] walks the page tree depth-first from a root page and
//! produces a sitemap protocol 0.9 document listing every visible page and the
//! documents published on it. [`SitemapPublisher`] wraps a builder for the
//! periodic job: it writes the result to disk and keeps a last-run message.
//!
//! # Traversal
//!
//! - Priority decays with depth: `1 / (depth + 1)`
//! - An invisible page prunes its whole subtree, documents included
//! - Documents of a page come right after the page, before its children
//! - A page is never expanded twice, so a corrupt tree still terminates
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sitemap_core::{SitemapBuilder, SitemapSettings};
//! use sitemap_store_sqlite::SqliteStore;
//!
//! let store = Arc::new(SqliteStore::connect("sqlite://portal.db")?);
//! let builder = SitemapBuilder::new(
//!     Arc::<SqliteStore>::clone(&store),
//!     store,
//!     SitemapSettings::default(),
//! );
//! let xml = builder.build()?;
//! ```

mod builder;
mod entry;
mod error;
mod publisher;
mod xml;

pub use builder::{SitemapBuilder, SitemapSettings};
pub use entry::{
    DEFAULT_DATE, SitemapEntry, document_location, format_priority, page_location,
    priority_for_depth, truncate_date,
};
pub use error::SitemapError;
pub use publisher::{PublishError, RunOutcome, SitemapPublisher};
pub use sitemap_config::ChangeFrequency;
pub use xml::render_urlset;
