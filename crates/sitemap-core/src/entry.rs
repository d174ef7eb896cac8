//! Sitemap entries and the value helpers used to build them.

use sitemap_config::ChangeFrequency;

use crate::error::SitemapError;

/// Date used for pages whose modification date cannot be retrieved.
pub const DEFAULT_DATE: &str = "2007-12-23";

/// Portal front controller every location points at.
const PORTAL_PATH: &str = "/jsp/site/Portal.jsp";

/// One `<url>` element of the sitemap.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Absolute URL, unescaped.
    pub location: String,
    /// Priority in (0, 1].
    pub priority: f64,
    /// Modification date as `YYYY-MM-DD`.
    pub last_modified: String,
    /// Advertised change frequency.
    pub change_frequency: ChangeFrequency,
}

/// Priority of a page at the given depth (root is depth 0).
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn priority_for_depth(depth: usize) -> f64 {
    1.0 / (depth as f64 + 1.0)
}

/// Decimal digits kept when formatting a priority.
const PRIORITY_PRECISION: usize = 16;

/// Plain decimal text of a priority (`1.0`, `0.5`, `0.3333333333333333`).
///
/// Never uses exponent notation, which `xsd:decimal` rejects; trailing zeros
/// are dropped but one fractional digit is always kept.
#[must_use]
pub fn format_priority(priority: f64) -> String {
    let fixed = format!("{priority:.prec$}", prec = PRIORITY_PRECISION);
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_owned()
    }
}

/// Location of a page.
#[must_use]
pub fn page_location(base_url: &str, page_id: i32) -> String {
    format!("{base_url}{PORTAL_PATH}?page_id={page_id}")
}

/// Location of a document as published by a portlet.
#[must_use]
pub fn document_location(base_url: &str, document_id: i32, portlet_id: i32) -> String {
    format!("{base_url}{PORTAL_PATH}?document_id={document_id}&portlet_id={portlet_id}")
}

/// Keep the leading `YYYY-MM-DD` of a raw timestamp.
///
/// The value is cut, not parsed or reformatted.
///
/// # Errors
///
/// Returns [`SitemapError::InvalidDate`] if the timestamp is shorter than ten
/// bytes or the tenth byte is not a character boundary.
pub fn truncate_date(raw: &str) -> Result<&str, SitemapError> {
    raw.get(..10)
        .ok_or_else(|| SitemapError::InvalidDate(raw.to_owned()))
}
