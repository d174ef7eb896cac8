//! Repository traits, records and error types.
//!
//! Provides [`PageStore`] and [`DocumentStore`] for abstracting the relational
//! store behind the portal, along with [`StoreError`] for unified error
//! handling across backends.
//!
//! # Timestamps
//!
//! Modification timestamps are carried as the raw text the backend returns
//! (e.g. `"2024-03-01 10:15:00"`). Consumers that need a calendar date take
//! the leading `YYYY-MM-DD` part themselves.

/// A portal page as seen by the page tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page identifier.
    pub id: i32,
    /// Owning page. `None` for the root (or a dangling sentinel).
    pub parent_id: Option<i32>,
    /// Whether the page is visible without any user context.
    pub visible: bool,
    /// Raw last-update timestamp. `None` when the backend has no date for the page.
    pub last_modified: Option<String>,
}

impl Page {
    /// Create a visible page with no parent and no modification date.
    #[must_use]
    pub fn new(id: i32) -> Self {
        Self {
            id,
            parent_id: None,
            visible: true,
            last_modified: None,
        }
    }

    /// Set the owning page.
    #[must_use]
    pub fn with_parent(mut self, parent_id: i32) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set the visibility flag.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set the raw last-update timestamp.
    #[must_use]
    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }
}

/// A document published on a page through a document-list portlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedDocument {
    /// Document identifier.
    pub id: i32,
    /// Portlet instance publishing the document.
    pub portlet_id: i32,
    /// Raw last-update timestamp.
    pub last_modified: String,
}

impl PublishedDocument {
    /// Create a document record.
    #[must_use]
    pub fn new(id: i32, portlet_id: i32, last_modified: impl Into<String>) -> Self {
        Self {
            id,
            portlet_id,
            last_modified: last_modified.into(),
        }
    }
}

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// Record does not exist.
    NotFound,
    /// Backend is unreachable or the connection failed.
    Unavailable,
    /// A row was returned but a column could not be decoded.
    InvalidData,
    /// Other/unknown error category.
    Other,
}

/// Store error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StoreError {
    /// Semantic error category.
    pub kind: StoreErrorKind,
    /// Page the failing query was about (if applicable).
    pub page_id: Option<i32>,
    /// Backend identifier (e.g., "Sqlite", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            page_id: None,
            backend: None,
            source: None,
        }
    }

    /// Attach page context.
    #[must_use]
    pub fn with_page(mut self, page_id: i32) -> Self {
        self.page_id = Some(page_id);
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error for a page.
    #[must_use]
    pub fn not_found(page_id: i32) -> Self {
        Self::new(StoreErrorKind::NotFound).with_page(page_id)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (page: 42)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StoreErrorKind::NotFound => "Not found",
            StoreErrorKind::Unavailable => "Unavailable",
            StoreErrorKind::InvalidData => "Invalid data",
            StoreErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(page_id) = self.page_id {
            write!(f, " (page: {page_id})")?;
        }

        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Page tree repository.
///
/// Children are returned in traversal order; implementations must keep that
/// order stable so repeated builds over unchanged data are identical.
pub trait PageStore: Send + Sync {
    /// Look up a page by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(page))` - The page exists
    /// - `Ok(None)` - No page with this id
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query itself fails.
    fn page(&self, id: i32) -> Result<Option<Page>, StoreError>;

    /// List the direct children of a page, in traversal order.
    ///
    /// Returns an empty list for leaves and unknown parents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn children(&self, parent_id: i32) -> Result<Vec<Page>, StoreError>;
}

/// Document repository.
pub trait DocumentStore: Send + Sync {
    /// List documents published on the page's document-list portlets.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or any row cannot be decoded.
    /// A single bad row fails the whole batch.
    fn documents_for_page(&self, page_id: i32) -> Result<Vec<PublishedDocument>, StoreError>;
}
