//! Sitemap protocol 0.9 serialization.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::entry::{SitemapEntry, format_priority};
use crate::error::SitemapError;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "http://www.sitemaps.org/schemas/sitemap/0.9 http://www.sitemaps.org/schemas/sitemap/0.9/sitemap.xsd";

/// Serialize entries, in order, into a complete sitemap document.
///
/// Text content is entity-escaped by the writer, so a `&` in a location comes
/// out as `&amp;`.
///
/// # Errors
///
/// Returns [`SitemapError::Xml`] if the writer fails.
pub fn render_urlset(entries: &[SitemapEntry]) -> Result<String, SitemapError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    let urlset = BytesStart::new("urlset").with_attributes([
        ("xmlns:xsi", XSI_NS),
        ("xsi:schemaLocation", SCHEMA_LOCATION),
        ("xmlns", SITEMAP_NS),
    ]);
    writer.write_event(Event::Start(urlset)).map_err(xml_error)?;

    for entry in entries {
        write_entry(&mut writer, entry)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("urlset")))
        .map_err(xml_error)?;

    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

fn write_entry(writer: &mut Writer<Vec<u8>>, entry: &SitemapEntry) -> Result<(), SitemapError> {
    writer
        .write_event(Event::Start(BytesStart::new("url")))
        .map_err(xml_error)?;
    write_text_element(writer, "loc", &entry.location)?;
    write_text_element(writer, "priority", &format_priority(entry.priority))?;
    write_text_element(writer, "lastmod", &entry.last_modified)?;
    write_text_element(writer, "changefreq", entry.change_frequency.as_str())?;
    writer
        .write_event(Event::End(BytesEnd::new("url")))
        .map_err(xml_error)?;
    Ok(())
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    text: &str,
) -> Result<(), SitemapError> {
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(xml_error)?;
    Ok(())
}

fn xml_error(err: impl std::fmt::Display) -> SitemapError {
    SitemapError::Xml(err.to_string())
}
