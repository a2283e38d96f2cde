//! Manifest, spine and navigation planning.
//!
//! All generated documents are rendered from one [`PackagePlan`], which is
//! what keeps ids, reading order and hrefs consistent between the package
//! document, the NCX and the navigation document.

use std::collections::HashMap;

use crate::book::Book;
use crate::error::{Error, Result};

use super::layout::{
    NAV_PATH, NCX_PATH, PACKAGE_PATH, STYLESHEET_PATH, TITLE_PAGE_PATH, chapter_id, chapter_path,
    relative_href,
};

pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";
pub const CSS_MEDIA_TYPE: &str = "text/css";
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

pub const NCX_ID: &str = "ncx";
pub const NAV_ID: &str = "toc";
pub const STYLESHEET_ID: &str = "css";
pub const TITLE_PAGE_ID: &str = "titlepage";

/// One `<item>` of the package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    /// Location in the output tree (see [`super::layout`]).
    pub path: String,
    pub media_type: &'static str,
    pub properties: Option<&'static str>,
}

impl ManifestItem {
    fn new(id: impl Into<String>, path: impl Into<String>, media_type: &'static str) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            media_type,
            properties: None,
        }
    }

    fn with_properties(mut self, properties: &'static str) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Href as written in the package document.
    pub fn href(&self) -> String {
        relative_href(PACKAGE_PATH, &self.path)
    }
}

/// A table of contents entry pointing at one chapter page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// Manifest id of the target page.
    pub id: String,
    pub label: String,
    pub path: String,
}

/// Everything the package-level documents need to agree on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePlan {
    pub manifest: Vec<ManifestItem>,
    /// Manifest ids in reading order.
    pub spine: Vec<String>,
    /// One entry per chapter, in chapter order.
    pub nav: Vec<NavEntry>,
}

impl PackagePlan {
    /// Plan the package for `book`.
    ///
    /// Chapter `i` gets id `chapter_{i:04}` and page `OEBPS/Text/{i:04}.xhtml`.
    /// A chapter with an empty title is listed under the book title.
    pub fn for_book(book: &Book, title_page: bool) -> Self {
        let mut manifest = vec![
            ManifestItem::new(NCX_ID, NCX_PATH, NCX_MEDIA_TYPE),
            ManifestItem::new(NAV_ID, NAV_PATH, XHTML_MEDIA_TYPE).with_properties("nav"),
            ManifestItem::new(STYLESHEET_ID, STYLESHEET_PATH, CSS_MEDIA_TYPE),
        ];
        let mut spine = Vec::with_capacity(book.chapters.len() + 1);
        let mut nav = Vec::with_capacity(book.chapters.len());

        if title_page {
            manifest.push(ManifestItem::new(TITLE_PAGE_ID, TITLE_PAGE_PATH, XHTML_MEDIA_TYPE));
            spine.push(TITLE_PAGE_ID.to_string());
        }

        for (index, chapter) in book.chapters.iter().enumerate() {
            let id = chapter_id(index);
            let path = chapter_path(index);
            let label = if chapter.title.is_empty() {
                book.metadata.title.clone()
            } else {
                chapter.title.clone()
            };

            manifest.push(ManifestItem::new(id.clone(), path.clone(), XHTML_MEDIA_TYPE));
            spine.push(id.clone());
            nav.push(NavEntry { id, label, path });
        }

        Self {
            manifest,
            spine,
            nav,
        }
    }

    pub fn item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }

    /// Manifest items that are chapter pages, in chapter order.
    pub fn chapter_items(&self) -> impl Iterator<Item = &ManifestItem> {
        self.nav.iter().filter_map(|entry| self.item(&entry.id))
    }

    /// First page in reading order, used for the guide reference.
    pub fn first_page(&self) -> Option<&ManifestItem> {
        self.spine.first().and_then(|id| self.item(id))
    }

    /// Check cross-references between manifest, spine and navigation.
    ///
    /// A failure here is a bug in plan construction, reported as
    /// [`Error::Structure`].
    pub fn validate(&self) -> Result<()> {
        let mut ids: HashMap<&str, &ManifestItem> = HashMap::with_capacity(self.manifest.len());
        for item in &self.manifest {
            if ids.insert(item.id.as_str(), item).is_some() {
                return Err(Error::Structure(format!("duplicate manifest id '{}'", item.id)));
            }
        }

        let mut seen = Vec::with_capacity(self.spine.len());
        for idref in &self.spine {
            if !ids.contains_key(idref.as_str()) {
                return Err(Error::Structure(format!("spine references unknown id '{idref}'")));
            }
            if seen.contains(&idref) {
                return Err(Error::Structure(format!("spine lists '{idref}' twice")));
            }
            seen.push(idref);
        }

        for entry in &self.nav {
            match ids.get(entry.id.as_str()) {
                Some(item) if item.path == entry.path => {}
                Some(item) => {
                    return Err(Error::Structure(format!(
                        "navigation entry '{}' points at {} but manifest has {}",
                        entry.id, entry.path, item.path
                    )));
                }
                None => {
                    return Err(Error::Structure(format!(
                        "navigation references unknown id '{}'",
                        entry.id
                    )));
                }
            }
        }

        let nav_ids: Vec<&str> = self.nav.iter().map(|e| e.id.as_str()).collect();
        let spine_chapters: Vec<&str> = self
            .spine
            .iter()
            .map(String::as_str)
            .filter(|id| nav_ids.contains(id))
            .collect();
        if spine_chapters != nav_ids {
            return Err(Error::Structure(
                "navigation order differs from spine order".to_string(),
            ));
        }

        Ok(())
    }
}
