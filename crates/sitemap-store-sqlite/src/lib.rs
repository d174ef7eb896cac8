//! SQLite-backed repositories for the portal sitemap.
//!
//! [`SqliteStore`] implements both [`PageStore`](sitemap_store::PageStore) and
//! [`DocumentStore`](sitemap_store::DocumentStore) over the portal schema
//! (`core_page`, `core_portlet`, `document_published`).
//!
//! Queries run through `sqlx` on a private single-threaded tokio runtime, so
//! every trait call is a blocking round-trip and the store can be used from
//! plain synchronous code.

mod store;

pub use store::SqliteStore;
