//! EPUB generation: document rendering, output tree and packaging.

mod documents;
pub mod layout;
mod manifest;
mod package;
mod writer;

pub use documents::{
    ChapterPage, ContainerDocument, NAV_HEADING, NavDocument, NcxDocument, PARAGRAPH_INDENT,
    PackageDocument, TitlePage, XmlDocument, XmlWriter,
};
pub use layout::{archive_file_name, chapter_id, chapter_path, relative_href};
pub use manifest::{ManifestItem, NavEntry, PackagePlan};
pub use package::{package_files_to_writer, package_tree, package_tree_to_writer};
pub use writer::{
    EpubConfig, GeneratedFile, generate_documents, write_epub, write_epub_to_writer, write_tree,
};
