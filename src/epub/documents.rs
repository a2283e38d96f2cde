//! Typed EPUB documents and their XML serialization.
//!
//! Each document kind is a plain struct rendered through [`XmlDocument`].
//! Text is escaped by quick-xml and cleared of characters XML 1.0 forbids,
//! so the output is well-formed whatever the novel contains.

use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::book::Metadata;
use crate::text::strip_control_chars;

use super::layout::{NAV_PATH, NCX_PATH, PACKAGE_PATH, STYLESHEET_PATH, relative_href};
use super::manifest::{ManifestItem, NavEntry};

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";
const OPS_NS: &str = "http://www.idpf.org/2007/ops";
const OPF_NS: &str = "http://www.idpf.org/2007/opf";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
const NCX_NS: &str = "http://www.daisy.org/z3986/2005/ncx/";
const CONTAINER_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:container";
const PACKAGE_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// Two ideographic spaces, the customary first-line indent of Chinese prose.
pub const PARAGRAPH_INDENT: &str = "\u{3000}\u{3000}";

/// Heading of the navigation document.
pub const NAV_HEADING: &str = "Table of Contents";

/// Indenting XML writer over an in-memory buffer.
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> io::Result<()> {
        self.inner.write_event(event).map_err(io_error)
    }

    pub fn declaration(&mut self) -> io::Result<()> {
        self.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
        self.emit(Event::Start(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    pub fn end(&mut self, name: &str) -> io::Result<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
        self.emit(Event::Empty(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    /// `<name attrs>text</name>` on one line. Characters XML cannot carry
    /// are dropped from `text`.
    pub fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> io::Result<()> {
        self.start(name, attrs)?;
        self.emit(Event::Text(BytesText::new(&strip_control_chars(text))))?;
        self.end(name)
    }

    pub fn finish(self) -> String {
        let mut out = String::from_utf8_lossy(&self.inner.into_inner()).into_owned();
        out.push('\n');
        out
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a quick-xml error to an io error.
fn io_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> io::Error {
    io::Error::other(e)
}

/// A document serialized as a standalone XML file.
pub trait XmlDocument {
    /// Write the root element and its content.
    fn write_root(&self, xml: &mut XmlWriter) -> io::Result<()>;

    /// Serialize with an XML declaration.
    fn to_xml(&self) -> io::Result<String> {
        let mut xml = XmlWriter::new();
        xml.declaration()?;
        self.write_root(&mut xml)?;
        Ok(xml.finish())
    }
}

/// Open `<html>` with `<head>` for an XHTML content document located at `path`.
fn open_xhtml(xml: &mut XmlWriter, language: &str, title: &str, path: &str) -> io::Result<()> {
    xml.start(
        "html",
        &[
            ("xmlns", XHTML_NS),
            ("xmlns:epub", OPS_NS),
            ("xml:lang", language),
            ("lang", language),
        ],
    )?;
    xml.start("head", &[])?;
    xml.text_element("title", &[], title)?;
    let stylesheet = relative_href(path, STYLESHEET_PATH);
    xml.empty(
        "link",
        &[("rel", "stylesheet"), ("type", "text/css"), ("href", stylesheet.as_str())],
    )?;
    xml.end("head")
}

/// One chapter page: the title as `<h2>`, each paragraph as an indented `<p>`.
#[derive(Debug, Clone)]
pub struct ChapterPage<'a> {
    /// Location of this page, for resolving the stylesheet link.
    pub path: &'a str,
    pub book_title: &'a str,
    pub language: &'a str,
    pub heading: &'a str,
    pub paragraphs: &'a [String],
}

impl XmlDocument for ChapterPage<'_> {
    fn write_root(&self, xml: &mut XmlWriter) -> io::Result<()> {
        open_xhtml(xml, self.language, self.book_title, self.path)?;
        xml.start("body", &[])?;
        xml.text_element("h2", &[], self.heading)?;
        for paragraph in self.paragraphs {
            xml.text_element("p", &[], &format!("{PARAGRAPH_INDENT}{paragraph}"))?;
        }
        xml.end("body")?;
        xml.end("html")
    }
}

/// Optional title page showing book title and author.
#[derive(Debug, Clone)]
pub struct TitlePage<'a> {
    pub path: &'a str,
    pub metadata: &'a Metadata,
}

impl XmlDocument for TitlePage<'_> {
    fn write_root(&self, xml: &mut XmlWriter) -> io::Result<()> {
        let metadata = self.metadata;
        open_xhtml(xml, metadata.language(), &metadata.title, self.path)?;
        xml.start("body", &[("epub:type", "titlepage")])?;
        xml.text_element("div", &[("class", "booktitle")], &metadata.title)?;
        if !metadata.author.is_empty() {
            xml.text_element("div", &[("class", "bookauthor")], &metadata.author)?;
        }
        xml.end("body")?;
        xml.end("html")
    }
}

/// `content.opf`: metadata, manifest, spine and guide.
#[derive(Debug, Clone)]
pub struct PackageDocument<'a> {
    pub metadata: &'a Metadata,
    pub identifier: &'a str,
    /// `dcterms:modified`, `YYYY-MM-DDThh:mm:ssZ`.
    pub modified: &'a str,
    pub manifest: &'a [ManifestItem],
    pub spine: &'a [String],
    /// Page the guide's "text" reference points at.
    pub start: Option<&'a ManifestItem>,
}

impl XmlDocument for PackageDocument<'_> {
    fn write_root(&self, xml: &mut XmlWriter) -> io::Result<()> {
        let metadata = self.metadata;
        xml.start(
            "package",
            &[
                ("xmlns", OPF_NS),
                ("version", "3.0"),
                ("unique-identifier", "BookId"),
            ],
        )?;

        xml.start("metadata", &[("xmlns:dc", DC_NS)])?;
        xml.text_element("dc:identifier", &[("id", "BookId")], self.identifier)?;
        xml.text_element("dc:title", &[], &metadata.title)?;
        if !metadata.author.is_empty() {
            xml.text_element("dc:creator", &[], &metadata.author)?;
        }
        xml.text_element("dc:language", &[], metadata.language())?;
        xml.text_element("meta", &[("property", "dcterms:modified")], self.modified)?;
        xml.end("metadata")?;

        xml.start("manifest", &[])?;
        for item in self.manifest {
            let href = item.href();
            let mut attrs = vec![
                ("id", item.id.as_str()),
                ("href", href.as_str()),
                ("media-type", item.media_type),
            ];
            if let Some(properties) = item.properties {
                attrs.push(("properties", properties));
            }
            xml.empty("item", &attrs)?;
        }
        xml.end("manifest")?;

        xml.start("spine", &[("toc", super::manifest::NCX_ID)])?;
        for idref in self.spine {
            xml.empty("itemref", &[("idref", idref.as_str())])?;
        }
        xml.end("spine")?;

        if let Some(start) = self.start {
            let href = start.href();
            xml.start("guide", &[])?;
            xml.empty(
                "reference",
                &[("type", "text"), ("title", "Beginning"), ("href", href.as_str())],
            )?;
            xml.end("guide")?;
        }

        xml.end("package")
    }
}

/// `toc.ncx`: the EPUB 2 navigation map, one navPoint per chapter, each
/// carrying the manifest id of its page.
#[derive(Debug, Clone)]
pub struct NcxDocument<'a> {
    pub metadata: &'a Metadata,
    pub identifier: &'a str,
    pub entries: &'a [NavEntry],
}

impl XmlDocument for NcxDocument<'_> {
    fn write_root(&self, xml: &mut XmlWriter) -> io::Result<()> {
        xml.start("ncx", &[("xmlns", NCX_NS), ("version", "2005-1")])?;

        xml.start("head", &[])?;
        xml.empty("meta", &[("name", "dtb:uid"), ("content", self.identifier)])?;
        xml.empty("meta", &[("name", "dtb:depth"), ("content", "1")])?;
        xml.empty("meta", &[("name", "dtb:totalPageCount"), ("content", "0")])?;
        xml.empty("meta", &[("name", "dtb:maxPageNumber"), ("content", "0")])?;
        xml.end("head")?;

        xml.start("docTitle", &[])?;
        xml.text_element("text", &[], &self.metadata.title)?;
        xml.end("docTitle")?;
        if !self.metadata.author.is_empty() {
            xml.start("docAuthor", &[])?;
            xml.text_element("text", &[], &self.metadata.author)?;
            xml.end("docAuthor")?;
        }

        xml.start("navMap", &[])?;
        for (index, entry) in self.entries.iter().enumerate() {
            // playOrder is 1-based.
            let play_order = (index + 1).to_string();
            let src = relative_href(NCX_PATH, &entry.path);
            xml.start(
                "navPoint",
                &[
                    ("id", entry.id.as_str()),
                    ("class", "chapter"),
                    ("playOrder", play_order.as_str()),
                ],
            )?;
            xml.start("navLabel", &[])?;
            xml.text_element("text", &[], &entry.label)?;
            xml.end("navLabel")?;
            xml.empty("content", &[("src", src.as_str())])?;
            xml.end("navPoint")?;
        }
        xml.end("navMap")?;

        xml.end("ncx")
    }
}

/// `Text/nav.xhtml`: the EPUB 3 navigation document.
#[derive(Debug, Clone)]
pub struct NavDocument<'a> {
    pub language: &'a str,
    pub entries: &'a [NavEntry],
}

impl XmlDocument for NavDocument<'_> {
    fn write_root(&self, xml: &mut XmlWriter) -> io::Result<()> {
        open_xhtml(xml, self.language, NAV_HEADING, NAV_PATH)?;
        xml.start("body", &[("epub:type", "frontmatter")])?;
        xml.start("nav", &[("epub:type", "toc"), ("id", "toc")])?;
        xml.text_element("h1", &[], NAV_HEADING)?;
        xml.start("ol", &[])?;
        for entry in self.entries {
            let href = relative_href(NAV_PATH, &entry.path);
            xml.start("li", &[("id", entry.id.as_str())])?;
            xml.text_element("a", &[("href", href.as_str())], &entry.label)?;
            xml.end("li")?;
        }
        xml.end("ol")?;
        xml.end("nav")?;
        xml.end("body")?;
        xml.end("html")
    }
}

/// `META-INF/container.xml`, pointing readers at the package document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerDocument;

impl XmlDocument for ContainerDocument {
    fn write_root(&self, xml: &mut XmlWriter) -> io::Result<()> {
        xml.start("container", &[("version", "1.0"), ("xmlns", CONTAINER_NS)])?;
        xml.start("rootfiles", &[])?;
        xml.empty(
            "rootfile",
            &[("full-path", PACKAGE_PATH), ("media-type", PACKAGE_MEDIA_TYPE)],
        )?;
        xml.end("rootfiles")?;
        xml.end("container")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::layout::chapter_path;

    #[test]
    fn test_chapter_page_markup() {
        let path = chapter_path(0);
        let paragraphs = vec!["第一段".to_string(), "第二段".to_string()];
        let page = ChapterPage {
            path: &path,
            book_title: "书名",
            language: "zh-CN",
            heading: "第一章 开始",
            paragraphs: &paragraphs,
        };
        let xml = page.to_xml().unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<title>书名</title>"));
        assert!(xml.contains(r#"href="../stylesheet.css""#));
        assert!(xml.contains("<h2>第一章 开始</h2>"));
        assert!(xml.contains("<p>\u{3000}\u{3000}第一段</p>"));
        assert!(xml.contains("<p>\u{3000}\u{3000}第二段</p>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let path = chapter_path(1);
        let paragraphs = vec!["a < b & c".to_string()];
        let page = ChapterPage {
            path: &path,
            book_title: "\"Quotes\"",
            language: "zh-CN",
            heading: "<第二章>",
            paragraphs: &paragraphs,
        };
        let xml = page.to_xml().unwrap();

        assert!(xml.contains("<h2>&lt;第二章&gt;</h2>"));
        assert!(xml.contains("a &lt; b &amp; c"));
        assert!(!xml.contains("<第二章>"));
    }

    #[test]
    fn test_illegal_xml_chars_are_not_written() {
        let path = chapter_path(0);
        let paragraphs = vec!["正文\u{1a}".to_string()];
        let metadata = Metadata::new("书\u{0}名");
        let page = ChapterPage {
            path: &path,
            book_title: &metadata.title,
            language: "zh-CN",
            heading: "第一章\u{1b}",
            paragraphs: &paragraphs,
        };
        let xml = page.to_xml().unwrap();

        assert!(xml.chars().all(crate::text::is_xml_char));
        assert!(xml.contains("<title>书名</title>"));
        assert!(xml.contains("<h2>第一章</h2>"));
        assert!(xml.contains("<p>\u{3000}\u{3000}正文</p>"));
    }

    #[test]
    fn test_container_points_at_package() {
        let xml = ContainerDocument.to_xml().unwrap();
        assert!(xml.contains(r#"full-path="OEBPS/content.opf""#));
        assert!(xml.contains(r#"media-type="application/oebps-package+xml""#));
    }

    #[test]
    fn test_ncx_play_order_starts_at_one() {
        let metadata = Metadata::new("书").with_author("作者");
        let entries = vec![
            NavEntry {
                id: "chapter_0000".to_string(),
                label: "前言".to_string(),
                path: chapter_path(0),
            },
            NavEntry {
                id: "chapter_0001".to_string(),
                label: "第一章".to_string(),
                path: chapter_path(1),
            },
        ];
        let xml = NcxDocument {
            metadata: &metadata,
            identifier: "urn:uuid:test",
            entries: &entries,
        }
        .to_xml()
        .unwrap();

        assert!(xml.contains(r#"<meta name="dtb:uid" content="urn:uuid:test"/>"#));
        assert!(xml.contains(r#"<navPoint id="chapter_0000" class="chapter" playOrder="1">"#));
        assert!(xml.contains(r#"<navPoint id="chapter_0001" class="chapter" playOrder="2">"#));
        assert!(xml.contains(r#"playOrder="2""#));
        assert!(!xml.contains(r#"playOrder="0""#));
        assert!(xml.contains(r#"<content src="Text/0001.xhtml"/>"#));
        assert!(xml.contains("<text>作者</text>"));
    }

    #[test]
    fn test_nav_links_are_siblings() {
        let entries = vec![NavEntry {
            id: "chapter_0000".to_string(),
            label: "第一章".to_string(),
            path: chapter_path(0),
        }];
        let xml = NavDocument {
            language: "zh-CN",
            entries: &entries,
        }
        .to_xml()
        .unwrap();

        assert!(xml.contains(r#"<nav epub:type="toc" id="toc">"#));
        assert!(xml.contains(r#"<li id="chapter_0000">"#));
        assert!(xml.contains(r#"<a href="0000.xhtml">第一章</a>"#));
    }
}
