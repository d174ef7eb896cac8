//! SQLite store implementation.

use std::str::FromStr;

use sitemap_store::{
    DocumentStore, Page, PageStore, PublishedDocument, StoreError, StoreErrorKind,
};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tokio::runtime::Runtime;

const BACKEND: &str = "Sqlite";

/// Role of pages readable without authentication.
const ROLE_NONE: &str = "none";

const SQL_FIND_PAGE: &str = "SELECT id_page, id_parent, role, CAST(date_update AS TEXT) AS date_update \
     FROM core_page WHERE id_page = ?";

const SQL_FIND_CHILD_PAGES: &str = "SELECT id_page, id_parent, role, CAST(date_update AS TEXT) AS date_update \
     FROM core_page WHERE id_parent = ? AND id_page <> id_parent \
     ORDER BY page_order, id_page";

const SQL_FIND_DOCUMENTS: &str = "SELECT document_published.id_document, core_portlet.id_portlet, \
     CAST(core_portlet.date_update AS TEXT) AS date_update \
     FROM core_portlet, document_published \
     WHERE core_portlet.id_portlet_type = 'DOCUMENT_LIST_PORTLET' \
     AND core_portlet.id_portlet = document_published.id_portlet \
     AND core_portlet.id_page = ? \
     ORDER BY core_portlet.id_portlet, document_published.document_order, document_published.id_document";

/// Portal repositories backed by a SQLite database.
///
/// Holds a single-connection pool. Each query borrows the connection for the
/// duration of the call and hands it back on every exit path; the pool is
/// closed when the store is dropped.
pub struct SqliteStore {
    pool: SqlitePool,
    runtime: Runtime,
}

impl SqliteStore {
    /// Open the database at `url` (e.g. `sqlite://portal.db`, `sqlite::memory:`).
    ///
    /// The database file must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the URL is invalid, the runtime cannot be
    /// started or the database cannot be opened.
    pub fn connect(url: &str) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                StoreError::new(StoreErrorKind::Unavailable)
                    .with_backend(BACKEND)
                    .with_source(e)
            })?;

        let options = SqliteConnectOptions::from_str(url).map_err(|e| store_error(e, None))?;

        // An in-memory database lives only as long as its connection.
        let pool = runtime
            .block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options),
            )
            .map_err(|e| store_error(e, None))?;

        tracing::debug!(url, "Connected to portal database");

        Ok(Self { pool, runtime })
    }

    #[cfg(test)]
    fn execute_script(&self, sql: &str) {
        self.runtime
            .block_on(sqlx::raw_sql(sql).execute(&self.pool))
            .unwrap();
    }
}

impl Drop for SqliteStore {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl PageStore for SqliteStore {
    fn page(&self, id: i32) -> Result<Option<Page>, StoreError> {
        let row = self
            .runtime
            .block_on(sqlx::query(SQL_FIND_PAGE).bind(id).fetch_optional(&self.pool))
            .map_err(|e| store_error(e, Some(id)))?;

        row.as_ref()
            .map(page_from_row)
            .transpose()
            .map_err(|e| store_error(e, Some(id)))
    }

    fn children(&self, parent_id: i32) -> Result<Vec<Page>, StoreError> {
        let rows = self
            .runtime
            .block_on(
                sqlx::query(SQL_FIND_CHILD_PAGES)
                    .bind(parent_id)
                    .fetch_all(&self.pool),
            )
            .map_err(|e| store_error(e, Some(parent_id)))?;

        rows.iter()
            .map(page_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| store_error(e, Some(parent_id)))
    }
}

impl DocumentStore for SqliteStore {
    fn documents_for_page(&self, page_id: i32) -> Result<Vec<PublishedDocument>, StoreError> {
        let rows = self
            .runtime
            .block_on(
                sqlx::query(SQL_FIND_DOCUMENTS)
                    .bind(page_id)
                    .fetch_all(&self.pool),
            )
            .map_err(|e| store_error(e, Some(page_id)))?;

        rows.iter()
            .map(document_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| store_error(e, Some(page_id)))
    }
}

fn page_from_row(row: &SqliteRow) -> Result<Page, sqlx::Error> {
    let role: Option<String> = row.try_get("role")?;
    Ok(Page {
        id: row.try_get("id_page")?,
        parent_id: row.try_get("id_parent")?,
        visible: role.as_deref().is_none_or(|r| r == ROLE_NONE),
        last_modified: row.try_get("date_update")?,
    })
}

/// Documents always carry a date; a NULL one is a decode failure.
fn document_from_row(row: &SqliteRow) -> Result<PublishedDocument, sqlx::Error> {
    // Decoding NULL straight into a String yields "" instead of failing.
    let last_modified: Option<String> = row.try_get("date_update")?;
    let last_modified = last_modified.ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "date_update".to_owned(),
        source: "unexpected NULL modification date".into(),
    })?;

    Ok(PublishedDocument {
        id: row.try_get("id_document")?,
        portlet_id: row.try_get("id_portlet")?,
        last_modified,
    })
}

/// Map a sqlx error onto the store error taxonomy.
fn store_error(err: sqlx::Error, page_id: Option<i32>) -> StoreError {
    let kind = match &err {
        sqlx::Error::RowNotFound => StoreErrorKind::NotFound,
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreErrorKind::Unavailable,
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_) => StoreErrorKind::InvalidData,
        _ => StoreErrorKind::Other,
    };

    let mut error = StoreError::new(kind).with_backend(BACKEND).with_source(err);
    if let Some(id) = page_id {
        error = error.with_page(id);
    }
    error
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use sitemap_core::{SitemapBuilder, SitemapError, SitemapSettings};

    use super::*;

    const SCHEMA: &str = "
        CREATE TABLE core_page (
            id_page INTEGER PRIMARY KEY,
            id_parent INTEGER,
            name TEXT,
            page_order INTEGER DEFAULT 0,
            role TEXT,
            date_update TEXT
        );
        CREATE TABLE core_portlet (
            id_portlet INTEGER PRIMARY KEY,
            id_portlet_type TEXT NOT NULL,
            id_page INTEGER NOT NULL,
            name TEXT,
            date_update TEXT
        );
        CREATE TABLE document_published (
            id_document INTEGER NOT NULL,
            id_portlet INTEGER NOT NULL,
            document_order INTEGER DEFAULT 0,
            PRIMARY KEY (id_document, id_portlet)
        );
    ";

    /// Home (1) with children Services (3, order 1) and News (2, order 2);
    /// Intranet (4) is restricted; Archive (5) has no date.
    const FIXTURES: &str = "
        INSERT INTO core_page VALUES (1, 0, 'Home', 1, 'none', '2024-01-10 08:00:00');
        INSERT INTO core_page VALUES (2, 1, 'News', 2, 'none', '2024-02-20 09:30:00');
        INSERT INTO core_page VALUES (3, 1, 'Services', 1, NULL, '2024-03-05 10:00:00');
        INSERT INTO core_page VALUES (4, 1, 'Intranet', 3, 'employees', '2024-03-06 10:00:00');
        INSERT INTO core_page VALUES (5, 2, 'Archive', 1, 'none', NULL);
        INSERT INTO core_page VALUES (6, 4, 'Staff', 1, 'none', '2024-03-07 10:00:00');

        INSERT INTO core_portlet VALUES (10, 'DOCUMENT_LIST_PORTLET', 2, 'Latest', '2024-02-21 11:00:00');
        INSERT INTO core_portlet VALUES (11, 'HTML_PORTLET', 2, 'Intro', '2024-02-22 11:00:00');
        INSERT INTO core_portlet VALUES (12, 'DOCUMENT_LIST_PORTLET', 3, 'Forms', '2024-03-08 11:00:00');

        INSERT INTO document_published VALUES (100, 10, 2);
        INSERT INTO document_published VALUES (101, 10, 1);
        INSERT INTO document_published VALUES (102, 11, 1);
        INSERT INTO document_published VALUES (103, 12, 1);
    ";

    fn store() -> SqliteStore {
        let store = SqliteStore::connect("sqlite::memory:").unwrap();
        store.execute_script(SCHEMA);
        store.execute_script(FIXTURES);
        store
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteStore>();
    }

    #[test]
    fn test_page_found() {
        let page = store().page(2).unwrap().unwrap();

        assert_eq!(
            page,
            Page {
                id: 2,
                parent_id: Some(1),
                visible: true,
                last_modified: Some("2024-02-20 09:30:00".to_owned()),
            }
        );
    }

    #[test]
    fn test_page_missing() {
        assert!(store().page(99).unwrap().is_none());
    }

    #[test]
    fn test_page_visibility_from_role() {
        let store = store();

        assert!(store.page(1).unwrap().unwrap().visible);
        assert!(store.page(3).unwrap().unwrap().visible);
        assert!(!store.page(4).unwrap().unwrap().visible);
    }

    #[test]
    fn test_page_without_date() {
        let page = store().page(5).unwrap().unwrap();

        assert!(page.last_modified.is_none());
    }

    #[test]
    fn test_children_ordered_by_page_order() {
        let ids: Vec<i32> = store().children(1).unwrap().iter().map(|p| p.id).collect();

        assert_eq!(ids, vec![3, 2, 4]);
    }

    #[test]
    fn test_children_of_leaf() {
        assert!(store().children(3).unwrap().is_empty());
    }

    #[test]
    fn test_children_skip_self_parent() {
        let store = store();
        store.execute_script("INSERT INTO core_page VALUES (7, 7, 'Loop', 1, 'none', NULL);");

        assert!(store.children(7).unwrap().is_empty());
    }

    #[test]
    fn test_documents_only_from_document_list_portlets() {
        let docs = store().documents_for_page(2).unwrap();

        assert_eq!(
            docs,
            vec![
                PublishedDocument::new(101, 10, "2024-02-21 11:00:00"),
                PublishedDocument::new(100, 10, "2024-02-21 11:00:00"),
            ]
        );
    }

    #[test]
    fn test_documents_for_page_without_portlets() {
        assert!(store().documents_for_page(1).unwrap().is_empty());
    }

    #[test]
    fn test_document_without_date_is_error() {
        let store = store();
        store.execute_script("UPDATE core_portlet SET date_update = NULL WHERE id_portlet = 12;");

        let err = store.documents_for_page(3).unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::InvalidData);
        assert_eq!(err.page_id, Some(3));
        assert_eq!(err.backend, Some("Sqlite"));
        assert!(err.to_string().contains("date_update"));
    }

    #[test]
    fn test_document_without_date_fails_build() {
        let store = store();
        store.execute_script("UPDATE core_portlet SET date_update = NULL WHERE id_portlet = 12;");
        let store = Arc::new(store);
        let builder = SitemapBuilder::new(
            Arc::<SqliteStore>::clone(&store),
            store,
            SitemapSettings::default(),
        );

        let err = builder.build().unwrap_err();

        let SitemapError::Store(store_err) = err else {
            panic!("expected a repository error, got {err:?}");
        };
        assert_eq!(store_err.kind, StoreErrorKind::InvalidData);
        assert_eq!(store_err.page_id, Some(3));
    }

    #[test]
    fn test_connect_missing_file_fails() {
        let result = SqliteStore::connect("sqlite:///nonexistent-dir/portal.db");

        let err = result.err().unwrap();
        assert_eq!(err.backend, Some("Sqlite"));
    }

    #[test]
    fn test_sitemap_from_database() {
        let store = Arc::new(store());
        let settings = SitemapSettings {
            base_url: "https://portal.example.com".to_owned(),
            ..SitemapSettings::default()
        };
        let builder = SitemapBuilder::new(Arc::<SqliteStore>::clone(&store), store, settings);

        let entries = builder.collect().unwrap();
        let locations: Vec<&str> = entries
            .iter()
            .map(|e| {
                e.location
                    .trim_start_matches("https://portal.example.com/jsp/site/Portal.jsp?")
            })
            .collect();

        assert_eq!(
            locations,
            vec![
                "page_id=1",
                "page_id=3",
                "document_id=103&portlet_id=12",
                "page_id=2",
                "document_id=101&portlet_id=10",
                "document_id=100&portlet_id=10",
                "page_id=5",
            ]
        );
        assert_eq!(entries[6].last_modified, sitemap_core::DEFAULT_DATE);
        assert_eq!(entries[2].last_modified, "2024-03-08");
    }
}
