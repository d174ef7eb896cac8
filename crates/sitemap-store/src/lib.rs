//! Repository abstraction for the portal sitemap.
//!
//! This crate provides the two read-only collaborators the sitemap builder
//! queries while walking the portal:
//!
//! - [`PageStore`] answers page lookups by id and ordered child lookups
//! - [`DocumentStore`] lists the documents published on a page through its
//!   "document list" portlets
//!
//! Both traits are synchronous: every call is a blocking round-trip to the
//! backend. Implementations live in separate crates (`sitemap-store-sqlite`);
//! an in-memory [`MockStore`] is available behind the `mock` feature flag.
//!
//! # Example
//!
//! ```ignore
//! use sitemap_store::{MockStore, Page, PageStore};
//!
//! let store = MockStore::new()
//!     .with_page(Page::new(1).with_last_modified("2024-03-01 10:00:00"))
//!     .with_page(Page::new(2).with_parent(1));
//!
//! let children = store.children(1)?;
//! assert_eq!(children[0].id, 2);
//! ```

#[cfg(feature = "mock")]
mod mock;
mod store;

#[cfg(feature = "mock")]
pub use mock::MockStore;
pub use store::{DocumentStore, Page, PageStore, PublishedDocument, StoreError, StoreErrorKind};
