//! Mock store implementation for testing.
//!
//! Provides [`MockStore`] for unit testing without a database.

use std::collections::{HashMap, HashSet};

use crate::store::{DocumentStore, Page, PageStore, PublishedDocument, StoreError, StoreErrorKind};

/// In-memory page tree and document repository.
///
/// Pages are registered with [`MockStore::with_page`]; a page with a parent is
/// appended to that parent's child list in insertion order. Use
/// [`MockStore::with_link`] to add extra parent/child edges (e.g. to model a
/// corrupt store with a cycle).
#[derive(Debug, Default)]
pub struct MockStore {
    pages: HashMap<i32, Page>,
    children: HashMap<i32, Vec<i32>>,
    documents: HashMap<i32, Vec<PublishedDocument>>,
    failing_pages: HashSet<i32>,
}

impl MockStore {
    /// Create a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page, linking it under its parent if it has one.
    #[must_use]
    pub fn with_page(mut self, page: Page) -> Self {
        if let Some(parent_id) = page.parent_id {
            self.children.entry(parent_id).or_default().push(page.id);
        }
        self.pages.insert(page.id, page);
        self
    }

    /// Add an extra child edge without touching the child's `parent_id`.
    #[must_use]
    pub fn with_link(mut self, parent_id: i32, child_id: i32) -> Self {
        self.children.entry(parent_id).or_default().push(child_id);
        self
    }

    /// Publish a document on a page.
    #[must_use]
    pub fn with_document(mut self, page_id: i32, document: PublishedDocument) -> Self {
        self.documents.entry(page_id).or_default().push(document);
        self
    }

    /// Make every query about this page fail with [`StoreErrorKind::Unavailable`].
    #[must_use]
    pub fn with_failure(mut self, page_id: i32) -> Self {
        self.failing_pages.insert(page_id);
        self
    }

    fn check(&self, page_id: i32) -> Result<(), StoreError> {
        if self.failing_pages.contains(&page_id) {
            return Err(StoreError::new(StoreErrorKind::Unavailable)
                .with_page(page_id)
                .with_backend("Mock"));
        }
        Ok(())
    }
}

impl PageStore for MockStore {
    fn page(&self, id: i32) -> Result<Option<Page>, StoreError> {
        self.check(id)?;
        Ok(self.pages.get(&id).cloned())
    }

    fn children(&self, parent_id: i32) -> Result<Vec<Page>, StoreError> {
        self.check(parent_id)?;
        let Some(ids) = self.children.get(&parent_id) else {
            return Ok(Vec::new());
        };
        ids.iter()
            .map(|id| {
                self.pages
                    .get(id)
                    .cloned()
                    .ok_or_else(|| StoreError::not_found(*id).with_backend("Mock"))
            })
            .collect()
    }
}

impl DocumentStore for MockStore {
    fn documents_for_page(&self, page_id: i32) -> Result<Vec<PublishedDocument>, StoreError> {
        self.check(page_id)?;
        Ok(self.documents.get(&page_id).cloned().unwrap_or_default())
    }
}
