//! Output tree layout.
//!
//! Every path here is relative to the output root and `/`-separated, which
//! is also the entry name used inside the archive.

use std::path::{Path, PathBuf};

pub const MIMETYPE: &[u8] = b"application/epub+zip";

pub const MIMETYPE_PATH: &str = "mimetype";
pub const CONTAINER_PATH: &str = "META-INF/container.xml";
pub const PACKAGE_PATH: &str = "OEBPS/content.opf";
pub const NCX_PATH: &str = "OEBPS/toc.ncx";
pub const STYLESHEET_PATH: &str = "OEBPS/stylesheet.css";
pub const TEXT_DIR: &str = "OEBPS/Text";
pub const NAV_PATH: &str = "OEBPS/Text/nav.xhtml";
pub const TITLE_PAGE_PATH: &str = "OEBPS/Text/title.xhtml";

/// Path of the page for the chapter at `index`: `OEBPS/Text/0000.xhtml`,
/// `OEBPS/Text/0001.xhtml`, ... Zero padding keeps lexicographic order
/// equal to reading order.
pub fn chapter_path(index: usize) -> String {
    format!("{TEXT_DIR}/{index:04}.xhtml")
}

/// Manifest id for the chapter at `index`.
pub fn chapter_id(index: usize) -> String {
    format!("chapter_{index:04}")
}

/// Href of `to` as seen from the document at `from`.
///
/// ```
/// use txtpub::epub::relative_href;
///
/// assert_eq!(relative_href("OEBPS/content.opf", "OEBPS/Text/0000.xhtml"), "Text/0000.xhtml");
/// assert_eq!(relative_href("OEBPS/Text/0000.xhtml", "OEBPS/stylesheet.css"), "../stylesheet.css");
/// ```
pub fn relative_href(from: &str, to: &str) -> String {
    let from_dirs: Vec<&str> = match from.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let to_parts: Vec<&str> = to.split('/').collect();
    let to_dirs = &to_parts[..to_parts.len() - 1];

    let common = from_dirs
        .iter()
        .zip(to_dirs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts = vec![".."; from_dirs.len() - common];
    parts.extend_from_slice(&to_parts[common..]);
    parts.join("/")
}

/// File name of the archive for a book title. Path separators are
/// replaced so the archive always lands directly in the output directory.
pub fn archive_file_name(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    let stem = if stem.is_empty() { "book" } else { stem.as_str() };
    format!("{stem}.epub")
}

/// Resolve a layout path against the output root.
pub fn resolve(root: &Path, path: &str) -> PathBuf {
    path.split('/').fold(root.to_path_buf(), |acc, part| acc.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_paths_are_zero_padded() {
        assert_eq!(chapter_path(0), "OEBPS/Text/0000.xhtml");
        assert_eq!(chapter_path(42), "OEBPS/Text/0042.xhtml");
        assert_eq!(chapter_id(7), "chapter_0007");
        assert!(chapter_path(9) < chapter_path(10));
    }

    #[test]
    fn test_relative_href() {
        assert_eq!(relative_href(PACKAGE_PATH, "OEBPS/Text/0000.xhtml"), "Text/0000.xhtml");
        assert_eq!(relative_href(PACKAGE_PATH, NCX_PATH), "toc.ncx");
        assert_eq!(relative_href(NCX_PATH, "OEBPS/Text/0003.xhtml"), "Text/0003.xhtml");
        assert_eq!(relative_href(NAV_PATH, "OEBPS/Text/0003.xhtml"), "0003.xhtml");
        assert_eq!(relative_href("OEBPS/Text/0000.xhtml", STYLESHEET_PATH), "../stylesheet.css");
        assert_eq!(relative_href(CONTAINER_PATH, PACKAGE_PATH), "../OEBPS/content.opf");
        assert_eq!(relative_href(MIMETYPE_PATH, PACKAGE_PATH), PACKAGE_PATH);
    }

    #[test]
    fn test_archive_file_name() {
        assert_eq!(archive_file_name("斗破苍穹"), "斗破苍穹.epub");
        assert_eq!(archive_file_name("a/b"), "a_b.epub");
        assert_eq!(archive_file_name("  "), "book.epub");
    }

    #[test]
    fn test_resolve() {
        let root = Path::new("out");
        assert_eq!(resolve(root, NAV_PATH), Path::new("out").join("OEBPS").join("Text").join("nav.xhtml"));
    }
}
