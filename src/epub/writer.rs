use std::collections::HashSet;
use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::book::Book;
use crate::error::{Error, Result};

use super::documents::{
    ChapterPage, ContainerDocument, NavDocument, NcxDocument, PackageDocument, TitlePage,
    XmlDocument,
};
use super::layout::{
    CONTAINER_PATH, MIMETYPE, MIMETYPE_PATH, NAV_PATH, NCX_PATH, PACKAGE_PATH, STYLESHEET_PATH,
    TEXT_DIR, TITLE_PAGE_PATH, archive_file_name, resolve,
};
use super::manifest::PackagePlan;
use super::package::{package_files_to_writer, package_tree};

const STYLESHEET: &str = include_str!("stylesheet.css");

/// Configuration for EPUB generation.
#[derive(Debug, Clone, Default)]
pub struct EpubConfig {
    /// Compression level for deflate (1-9, default 6). 0 stores entries
    /// uncompressed.
    pub compression_level: Option<u32>,
    /// Fixed `dcterms:modified` value. Defaults to the current UTC time.
    pub modified: Option<String>,
    /// Add a title page before the first chapter.
    pub title_page: bool,
}

impl EpubConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = Some(level.min(9));
        self
    }

    pub fn with_modified(mut self, modified: impl Into<String>) -> Self {
        self.modified = Some(modified.into());
        self
    }

    pub fn with_title_page(mut self, title_page: bool) -> Self {
        self.title_page = title_page;
        self
    }

    fn modified(&self) -> String {
        self.modified
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string())
    }
}

/// A generated file and its location in the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub data: Vec<u8>,
}

impl GeneratedFile {
    fn new(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }
}

/// Render every document of the package for `book`.
///
/// Files come back in package order: mimetype, container, package
/// document, NCX, stylesheet, navigation, optional title page, chapters.
pub fn generate_documents(book: &Book, config: &EpubConfig) -> Result<Vec<GeneratedFile>> {
    let plan = PackagePlan::for_book(book, config.title_page);
    plan.validate()?;

    let metadata = &book.metadata;
    let identifier = metadata.identifier();
    let modified = config.modified();
    let render = |path: &str, xml: std::io::Result<String>| {
        xml.map(|xml| GeneratedFile::new(path, xml))
            .map_err(|e| Error::output(path, e))
    };

    let mut files = Vec::with_capacity(plan.manifest.len() + 2);
    files.push(GeneratedFile::new(MIMETYPE_PATH, MIMETYPE));
    files.push(render(CONTAINER_PATH, ContainerDocument.to_xml())?);
    files.push(render(
        PACKAGE_PATH,
        PackageDocument {
            metadata,
            identifier: &identifier,
            modified: &modified,
            manifest: &plan.manifest,
            spine: &plan.spine,
            start: plan.first_page(),
        }
        .to_xml(),
    )?);
    files.push(render(
        NCX_PATH,
        NcxDocument {
            metadata,
            identifier: &identifier,
            entries: &plan.nav,
        }
        .to_xml(),
    )?);
    files.push(GeneratedFile::new(STYLESHEET_PATH, STYLESHEET));
    files.push(render(
        NAV_PATH,
        NavDocument {
            language: metadata.language(),
            entries: &plan.nav,
        }
        .to_xml(),
    )?);

    if config.title_page {
        files.push(render(
            TITLE_PAGE_PATH,
            TitlePage {
                path: TITLE_PAGE_PATH,
                metadata,
            }
            .to_xml(),
        )?);
    }

    for (chapter, entry) in book.chapters.iter().zip(&plan.nav) {
        let page = ChapterPage {
            path: &entry.path,
            book_title: &metadata.title,
            language: metadata.language(),
            heading: &entry.label,
            paragraphs: &chapter.body,
        };
        files.push(render(entry.path.as_str(), page.to_xml())?);
    }

    debug!(files = files.len(), chapters = plan.nav.len(), "generated documents");
    Ok(files)
}

/// Write generated files below `root`, creating directories as needed.
///
/// Pages in `OEBPS/Text` left over from an earlier run (for example one
/// that found more chapters) are removed so the tree matches the manifest.
pub fn write_tree(root: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = resolve(root, &file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::output(parent, e))?;
        }
        fs::write(&path, &file.data).map_err(|e| Error::output(&path, e))?;
        debug!(path = %path.display(), bytes = file.data.len(), "wrote file");
    }

    remove_stale_pages(root, files)
}

fn remove_stale_pages(root: &Path, files: &[GeneratedFile]) -> Result<()> {
    let text_dir = resolve(root, TEXT_DIR);
    let entries = match fs::read_dir(&text_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::output(&text_dir, e)),
    };

    let current: HashSet<PathBuf> = files.iter().map(|f| resolve(root, &f.path)).collect();
    for entry in entries {
        let path = entry.map_err(|e| Error::output(&text_dir, e))?.path();
        let is_page = path.extension().and_then(|e| e.to_str()) == Some("xhtml");
        if is_page && !current.contains(&path) {
            fs::remove_file(&path).map_err(|e| Error::output(&path, e))?;
            debug!(path = %path.display(), "removed stale page");
        }
    }
    Ok(())
}

/// Generate, write and package `book` into `output_dir`.
///
/// Returns the path of the written archive, `<output_dir>/<title>.epub`.
pub fn write_epub<P: AsRef<Path>>(book: &Book, config: &EpubConfig, output_dir: P) -> Result<PathBuf> {
    let root = output_dir.as_ref();
    let files = generate_documents(book, config)?;
    write_tree(root, &files)?;
    info!(root = %root.display(), files = files.len(), "output tree written");

    let archive = root.join(archive_file_name(&book.metadata.title));
    package_tree(root, &archive, config.compression_level)?;
    info!(archive = %archive.display(), "archive written");
    Ok(archive)
}

/// Generate and package `book` into any [`Write`] + [`Seek`] destination
/// without touching the filesystem.
pub fn write_epub_to_writer<W: Write + Seek>(book: &Book, config: &EpubConfig, writer: W) -> Result<W> {
    let files = generate_documents(book, config)?;
    package_files_to_writer(&files, writer, config.compression_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Chapter, Metadata};

    fn sample_book() -> Book {
        Book::new(
            Metadata::new("样书").with_author("某人"),
            vec![
                Chapter::new("前言", vec!["开头".to_string()]),
                Chapter::new("第一章 开始", vec!["内容".to_string()]),
            ],
        )
    }

    #[test]
    fn test_generated_files_in_package_order() {
        let files = generate_documents(&sample_book(), &EpubConfig::new()).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "mimetype",
                "META-INF/container.xml",
                "OEBPS/content.opf",
                "OEBPS/toc.ncx",
                "OEBPS/stylesheet.css",
                "OEBPS/Text/nav.xhtml",
                "OEBPS/Text/0000.xhtml",
                "OEBPS/Text/0001.xhtml",
            ]
        );
        assert_eq!(files[0].data, b"application/epub+zip");
    }

    #[test]
    fn test_fixed_modified_timestamp() {
        let config = EpubConfig::new().with_modified("2020-02-02T02:02:02Z");
        let files = generate_documents(&sample_book(), &config).unwrap();
        let opf = String::from_utf8(files[2].data.clone()).unwrap();
        assert!(opf.contains(r#"<meta property="dcterms:modified">2020-02-02T02:02:02Z</meta>"#));
    }

    #[test]
    fn test_title_page_is_generated() {
        let config = EpubConfig::new().with_title_page(true);
        let files = generate_documents(&sample_book(), &config).unwrap();
        let page = files
            .iter()
            .find(|f| f.path == TITLE_PAGE_PATH)
            .expect("title page");
        let xml = String::from_utf8(page.data.clone()).unwrap();
        assert!(xml.contains(r#"<div class="booktitle">样书</div>"#));
        assert!(xml.contains(r#"<div class="bookauthor">某人</div>"#));
    }

    #[test]
    fn test_uncompressed_archive_is_readable() {
        let config = EpubConfig::new().with_compression_level(0);
        let cursor =
            write_epub_to_writer(&sample_book(), &config, std::io::Cursor::new(Vec::new())).unwrap();

        let archive = zip::ZipArchive::new(std::io::Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.len(), 8);
    }

    #[test]
    fn test_compression_level_is_clamped() {
        assert_eq!(EpubConfig::new().with_compression_level(12).compression_level, Some(9));
    }
}
