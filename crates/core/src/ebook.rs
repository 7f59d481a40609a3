//! EPUB container assembly.
//!
//! A minimal EPUB 3 writer: one content section wrapping the rendered
//! body markup, plus the fixed container scaffolding (stored `mimetype`
//! entry, `container.xml`, package document, navigation document). The
//! whole archive is assembled in memory so the caller can write the
//! artifact in a single operation.

use std::io::{Cursor, Write};

use chrono::Utc;
use uuid::Uuid;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::{ColligoError, Result};

/// Builds an EPUB archive holding `body_html` as its single section.
///
/// `title` becomes the publication title and the navigation entry label.
pub fn build_epub(title: &str, body_html: &str) -> Result<Vec<u8>> {
    let book_id = Uuid::new_v4();
    let modified = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = FileOptions::default();

    // The EPUB OCF requires mimetype first and uncompressed.
    start_entry(&mut zip, "mimetype", stored)?;
    zip.write_all(b"application/epub+zip")?;

    start_entry(&mut zip, "META-INF/container.xml", deflated)?;
    zip.write_all(CONTAINER_XML.as_bytes())?;

    start_entry(&mut zip, "OEBPS/content.opf", deflated)?;
    zip.write_all(package_document(title, &book_id, &modified).as_bytes())?;

    start_entry(&mut zip, "OEBPS/nav.xhtml", deflated)?;
    zip.write_all(nav_document(title).as_bytes())?;

    start_entry(&mut zip, "OEBPS/section.xhtml", deflated)?;
    zip.write_all(section_document(title, body_html).as_bytes())?;

    let cursor = zip
        .finish()
        .map_err(|e| ColligoError::RenderFailed(format!("EPUB assembly failed: {}", e)))?;

    Ok(cursor.into_inner())
}

fn start_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    options: FileOptions,
) -> Result<()> {
    zip.start_file(name, options)
        .map_err(|e| ColligoError::RenderFailed(format!("EPUB assembly failed: {}", e)))
}

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

fn package_document(title: &str, book_id: &Uuid, modified: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="book-id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="book-id">urn:uuid:{id}</dc:identifier>
    <dc:title>{title}</dc:title>
    <dc:language>en</dc:language>
    <meta property="dcterms:modified">{modified}</meta>
  </metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="section" href="section.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="section"/>
  </spine>
</package>
"#,
        id = book_id,
        title = escape_xml(title),
        modified = modified,
    )
}

fn nav_document(title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>{title}</title></head>
<body>
  <nav epub:type="toc">
    <ol><li><a href="section.xhtml">{title}</a></li></ol>
  </nav>
</body>
</html>
"#,
        title = escape_xml(title),
    )
}

fn section_document(title: &str, body_html: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>{title}</title><meta charset="utf-8"/></head>
<body>
{body}
</body>
</html>
"#,
        title = escape_xml(title),
        body = body_html,
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_build_epub_layout() {
        let bytes = build_epub("My Book", "<p>Hello</p>").unwrap();
        let names = entry_names(&bytes);

        assert_eq!(names[0], "mimetype");
        assert!(names.contains(&"META-INF/container.xml".to_string()));
        assert!(names.contains(&"OEBPS/content.opf".to_string()));
        assert!(names.contains(&"OEBPS/nav.xhtml".to_string()));
        assert!(names.contains(&"OEBPS/section.xhtml".to_string()));
    }

    #[test]
    fn test_mimetype_is_stored_uncompressed() {
        let bytes = build_epub("My Book", "<p>Hello</p>").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let entry = archive.by_name("mimetype").unwrap();

        assert_eq!(entry.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn test_section_carries_body_and_title() {
        let bytes = build_epub("Tom & Jerry", "<p>Hello</p>").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let mut section = String::new();
        archive
            .by_name("OEBPS/section.xhtml")
            .unwrap()
            .read_to_string(&mut section)
            .unwrap();

        assert!(section.contains("<p>Hello</p>"));
        assert!(section.contains("Tom &amp; Jerry"));
    }
}
