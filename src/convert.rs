//! The end-to-end conversion: text file in, EPUB out.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::book::{Book, Metadata};
use crate::epub::{EpubConfig, write_epub};
use crate::error::{Error, Result};
use crate::text::{Candidate, normalize_document, segment_text};

/// One conversion run.
///
/// # Example
///
/// ```no_run
/// use txtpub::{Conversion, Metadata};
///
/// let report = Conversion::new(Metadata::new("斗破苍穹").with_author("天蚕土豆"), "out").run()?;
/// println!("{} chapters -> {}", report.chapters, report.archive.display());
/// # Ok::<(), txtpub::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Conversion {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub metadata: Metadata,
    pub epub: EpubConfig,
}

/// Summary of a finished conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub archive: PathBuf,
    pub chapters: usize,
    /// `None` if the input's encoding could not be determined.
    pub encoding: Option<Candidate>,
}

impl Conversion {
    /// Convert `<title>.txt` in the working directory into `output_dir`.
    pub fn new(metadata: Metadata, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: default_input(&metadata.title),
            output_dir: output_dir.into(),
            metadata,
            epub: EpubConfig::default(),
        }
    }

    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }

    pub fn with_epub_config(mut self, config: EpubConfig) -> Self {
        self.epub = config;
        self
    }

    /// Read, decode and segment the input file.
    pub fn read_book(&self) -> Result<(Book, Option<Candidate>)> {
        let bytes = read_input(&self.input)?;
        let decoded = normalize_document(&bytes);
        match decoded.encoding {
            Some(encoding) => info!(input = %self.input.display(), %encoding, "decoded input"),
            None => warn!(
                input = %self.input.display(),
                "could not determine input encoding, text may be garbled"
            ),
        }

        let chapters = segment_text(&decoded.text);
        info!(chapters = chapters.len(), "segmented chapters");
        Ok((Book::new(self.metadata.clone(), chapters), decoded.encoding))
    }

    pub fn run(&self) -> Result<ConversionReport> {
        let (book, encoding) = self.read_book()?;
        let archive = write_epub(&book, &self.epub, &self.output_dir)?;
        Ok(ConversionReport {
            archive,
            chapters: book.chapters.len(),
            encoding,
        })
    }
}

/// The input file for a book name: `<name>.txt`.
pub fn default_input(name: &str) -> PathBuf {
    PathBuf::from(format!("{name}.txt"))
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::InputNotFound(path.to_path_buf())
        } else {
            Error::InputRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_input_uses_book_name() {
        assert_eq!(default_input("三体"), PathBuf::from("三体.txt"));
        let conversion = Conversion::new(Metadata::new("三体"), "out");
        assert_eq!(conversion.input, PathBuf::from("三体.txt"));
    }

    #[test]
    fn test_missing_input_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let conversion = Conversion::new(Metadata::new("nope"), dir.path()).with_input(&missing);

        match conversion.run() {
            Err(Error::InputNotFound(path)) => assert_eq!(path, missing),
            other => panic!("expected InputNotFound, got {other:?}"),
        }
    }
}
