//! Depth-first sitemap builder.

use std::collections::HashSet;
use std::sync::Arc;

use sitemap_config::{ChangeFrequency, Config};
use sitemap_store::{DocumentStore, Page, PageStore, PublishedDocument};

use crate::entry::{
    DEFAULT_DATE, SitemapEntry, document_location, page_location, priority_for_depth,
    truncate_date,
};
use crate::error::SitemapError;
use crate::xml::render_urlset;

/// Values the builder needs, fixed for the lifetime of a builder.
#[derive(Clone, Debug)]
pub struct SitemapSettings {
    /// Production base URL, without trailing slash.
    pub base_url: String,
    /// Page the traversal starts from.
    pub root_page_id: i32,
    /// Change frequency for page entries.
    pub page_changefreq: ChangeFrequency,
    /// Change frequency for document entries.
    pub document_changefreq: ChangeFrequency,
}

impl SitemapSettings {
    /// Take the sitemap settings out of a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.site.base_url.clone(),
            root_page_id: config.sitemap.root_page_id,
            page_changefreq: config.sitemap.page_changefreq,
            document_changefreq: config.sitemap.document_changefreq,
        }
    }
}

impl Default for SitemapSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_owned(),
            root_page_id: 1,
            page_changefreq: ChangeFrequency::Weekly,
            document_changefreq: ChangeFrequency::Monthly,
        }
    }
}

/// Builds the sitemap of a portal from its page tree and document repositories.
///
/// Each call to [`build`](Self::build) performs a fresh traversal; the builder
/// holds no state between calls.
pub struct SitemapBuilder {
    pages: Arc<dyn PageStore>,
    documents: Arc<dyn DocumentStore>,
    settings: SitemapSettings,
}

impl SitemapBuilder {
    /// Create a builder over the given repositories.
    #[must_use]
    pub fn new(
        pages: Arc<dyn PageStore>,
        documents: Arc<dyn DocumentStore>,
        settings: SitemapSettings,
    ) -> Self {
        Self {
            pages,
            documents,
            settings,
        }
    }

    /// Build the complete sitemap document.
    ///
    /// # Errors
    ///
    /// Fails on the first unrecoverable condition: missing root page, store
    /// failure or malformed date. No partial document is returned.
    pub fn build(&self) -> Result<String, SitemapError> {
        let entries = self.collect()?;
        render_urlset(&entries)
    }

    /// Walk the page tree and return the entries in emission order.
    ///
    /// Pre-order: a page, then its documents, then each child subtree in
    /// repository order. The walk uses an explicit stack so depth is bounded
    /// by the heap, not the call stack.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn collect(&self) -> Result<Vec<SitemapEntry>, SitemapError> {
        let root_id = self.settings.root_page_id;
        let root = self
            .pages
            .page(root_id)?
            .ok_or(SitemapError::PageNotFound(root_id))?;

        let mut entries = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![(root, 0_usize)];

        while let Some((page, depth)) = stack.pop() {
            if !visited.insert(page.id) {
                tracing::warn!(page_id = page.id, depth, "Page reached twice, skipping");
                continue;
            }

            if !page.visible {
                tracing::debug!(page_id = page.id, depth, "Pruning invisible page");
                continue;
            }

            let priority = priority_for_depth(depth);
            entries.push(self.page_entry(&page, priority)?);

            for document in self.documents.documents_for_page(page.id)? {
                entries.push(self.document_entry(&document, priority)?);
            }

            let children = self.pages.children(page.id)?;
            stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
        }

        tracing::debug!(
            root_page_id = root_id,
            entries = entries.len(),
            pages = visited.len(),
            "Page tree walked"
        );

        Ok(entries)
    }

    fn page_entry(&self, page: &Page, priority: f64) -> Result<SitemapEntry, SitemapError> {
        let last_modified = match &page.last_modified {
            Some(raw) => truncate_date(raw)?,
            None => {
                tracing::debug!(page_id = page.id, "No modification date, using default");
                DEFAULT_DATE
            }
        };

        Ok(SitemapEntry {
            location: page_location(&self.settings.base_url, page.id),
            priority,
            last_modified: last_modified.to_owned(),
            change_frequency: self.settings.page_changefreq,
        })
    }

    fn document_entry(
        &self,
        document: &PublishedDocument,
        priority: f64,
    ) -> Result<SitemapEntry, SitemapError> {
        Ok(SitemapEntry {
            location: document_location(
                &self.settings.base_url,
                document.id,
                document.portlet_id,
            ),
            priority,
            last_modified: truncate_date(&document.last_modified)?.to_owned(),
            change_frequency: self.settings.document_changefreq,
        })
    }
}
