//! # txtpub
//!
//! Convert plain-text novels into EPUB 3 packages.
//!
//! The pipeline runs in one direction:
//!
//! 1. [`text::normalize_document`] decodes the raw bytes (UTF-8, GBK, Big5,
//!    EUC-JP, EUC-KR, UTF-16 or UTF-32, first match wins).
//! 2. [`text::segment_text`] splits the text into [`Chapter`]s at lines that
//!    look like chapter titles (`第十章 总结`, `125 走向未来`, `# 序`).
//! 3. [`epub::generate_documents`] renders the chapter pages, package
//!    document, NCX, navigation document and stylesheet from one
//!    consistent [`epub::PackagePlan`].
//! 4. [`epub::write_epub`] writes the output tree and packages it, with the
//!    uncompressed `mimetype` entry first.
//!
//! ## Quick Start
//!
//! ```no_run
//! use txtpub::{Conversion, EpubConfig, Metadata};
//!
//! let metadata = Metadata::new("我的小说").with_author("作者");
//! let report = Conversion::new(metadata, "out")
//!     .with_epub_config(EpubConfig::new().with_title_page(true))
//!     .run()?;
//! println!("wrote {}", report.archive.display());
//! # Ok::<(), txtpub::Error>(())
//! ```
//!
//! ## Working with Books
//!
//! ```
//! use std::io::Cursor;
//! use txtpub::{Book, EpubConfig, Metadata, text};
//!
//! let chapters = text::segment_text("第一章 开始\n正文\n第二章 继续\n更多正文");
//! let book = Book::new(Metadata::new("示例").with_author("某人"), chapters);
//! let archive = txtpub::epub::write_epub_to_writer(&book, &EpubConfig::new(), Cursor::new(Vec::new()))?;
//! assert!(!archive.into_inner().is_empty());
//! # Ok::<(), txtpub::Error>(())
//! ```

pub mod book;
pub mod convert;
pub mod epub;
pub mod error;
pub mod text;

pub use book::{Book, Chapter, Metadata};
pub use convert::{Conversion, ConversionReport};
pub use epub::{EpubConfig, write_epub};
pub use error::{Error, Result};
