//! ZIP packaging of the output tree.
//!
//! EPUB readers locate the container by its first entry: `mimetype`, stored
//! without compression and containing exactly `application/epub+zip`.
//! Everything else is deflated.

use std::fs::{self, File};
use std::io::{self, Seek, Write};
use std::path::Path;

use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

use crate::error::{Error, Result};

use super::layout::{CONTAINER_PATH, MIMETYPE, MIMETYPE_PATH};
use super::writer::GeneratedFile;

const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Start an archive: write the stored `mimetype` entry and return the
/// writer with the options to use for every other entry. Level 0 stores
/// entries uncompressed, since Deflate has no level 0.
fn start_archive<W: Write + Seek>(
    writer: W,
    compression_level: Option<u32>,
) -> Result<(ZipWriter<W>, SimpleFileOptions)> {
    let mut zip = ZipWriter::new(writer);

    let compression_level = compression_level.unwrap_or(DEFAULT_COMPRESSION_LEVEL);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = match compression_level {
        0 => stored,
        level => SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(level.min(9) as i64)),
    };

    // Must be first, uncompressed
    zip.start_file(MIMETYPE_PATH, stored)?;
    zip.write_all(MIMETYPE).map_err(ZipError::Io)?;

    Ok((zip, deflated))
}

/// Package in-memory files. A `mimetype` entry in `files` is ignored since
/// the archive always starts with its own.
pub fn package_files_to_writer<W: Write + Seek>(
    files: &[GeneratedFile],
    writer: W,
    compression_level: Option<u32>,
) -> Result<W> {
    let (mut zip, deflated) = start_archive(writer, compression_level)?;

    for file in files.iter().filter(|f| f.path != MIMETYPE_PATH) {
        zip.start_file(file.path.as_str(), deflated)?;
        zip.write_all(&file.data).map_err(ZipError::Io)?;
    }

    Ok(zip.finish()?)
}

/// Package every file below `root` into a writer.
///
/// `META-INF/container.xml` follows `mimetype`; the remaining files are
/// added in sorted path order. The root `mimetype` file and any `.epub`
/// files are skipped.
pub fn package_tree_to_writer<W: Write + Seek>(
    root: &Path,
    writer: W,
    compression_level: Option<u32>,
) -> Result<W> {
    let mut entries = Vec::new();
    collect_entries(root, root, &mut entries)?;
    entries.retain(|name| name != MIMETYPE_PATH && !name.ends_with(".epub"));
    entries.sort_by(|a, b| (a != CONTAINER_PATH, a).cmp(&(b != CONTAINER_PATH, b)));

    let (mut zip, deflated) = start_archive(writer, compression_level)?;
    for name in &entries {
        let path = super::layout::resolve(root, name);
        let mut file = File::open(&path).map_err(|source| Error::InputRead {
            path: path.clone(),
            source,
        })?;
        zip.start_file(name.as_str(), deflated)?;
        io::copy(&mut file, &mut zip).map_err(|source| Error::InputRead { path, source })?;
        debug!(entry = %name, "packaged");
    }

    Ok(zip.finish()?)
}

/// Package the tree below `root` into the archive file at `archive`.
pub fn package_tree(root: &Path, archive: &Path, compression_level: Option<u32>) -> Result<()> {
    let file = File::create(archive).map_err(|e| Error::output(archive, e))?;
    let mut file = package_tree_to_writer(root, file, compression_level)?;
    file.flush().map_err(|e| Error::output(archive, e))?;
    Ok(())
}

/// Recursively gather `/`-separated paths of regular files below `dir`.
fn collect_entries(root: &Path, dir: &Path, entries: &mut Vec<String>) -> Result<()> {
    let read_error = |source| Error::InputRead {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(read_error)?;

        if file_type.is_dir() {
            collect_entries(root, &path, entries)?;
        } else if file_type.is_file() {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            let name: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            entries.push(name.join("/"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn file(path: &str, data: &str) -> GeneratedFile {
        GeneratedFile {
            path: path.to_string(),
            data: data.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_mimetype_first_and_stored() {
        let files = vec![
            file("mimetype", "application/epub+zip"),
            file("META-INF/container.xml", "<container/>"),
            file("OEBPS/Text/0000.xhtml", "<html/>"),
        ];
        let cursor = package_files_to_writer(&files, Cursor::new(Vec::new()), None).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.len(), 3);

        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
        let mut content = String::new();
        first.read_to_string(&mut content).unwrap();
        assert_eq!(content, "application/epub+zip");
        drop(first);

        let second = archive.by_index(1).unwrap();
        assert_eq!(second.name(), "META-INF/container.xml");
        assert_eq!(second.compression(), CompressionMethod::Deflated);
    }

    #[test]
    fn test_level_zero_stores_entries() {
        let files = vec![
            file("mimetype", "application/epub+zip"),
            file("META-INF/container.xml", "<container/>"),
            file("OEBPS/Text/0000.xhtml", "<p>正文</p>"),
        ];
        let cursor = package_files_to_writer(&files, Cursor::new(Vec::new()), Some(0)).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.len(), 3);
        for i in 0..archive.len() {
            let entry = archive.by_index(i).unwrap();
            assert_eq!(entry.compression(), CompressionMethod::Stored, "{}", entry.name());
        }

        let mut page = archive.by_name("OEBPS/Text/0000.xhtml").unwrap();
        let mut content = String::new();
        page.read_to_string(&mut content).unwrap();
        assert_eq!(content, "<p>正文</p>");
    }

    #[test]
    fn test_level_one_deflates_entries() {
        let files = vec![file("OEBPS/Text/0000.xhtml", "<p>正文</p>")];
        let cursor = package_files_to_writer(&files, Cursor::new(Vec::new()), Some(1)).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.by_index(1).unwrap().compression(), CompressionMethod::Deflated);
    }

    #[test]
    fn test_tree_order_and_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("META-INF")).unwrap();
        fs::create_dir_all(root.join("OEBPS").join("Text")).unwrap();
        fs::write(root.join("mimetype"), "application/epub+zip").unwrap();
        fs::write(root.join("META-INF").join("container.xml"), "<container/>").unwrap();
        fs::write(root.join("OEBPS").join("content.opf"), "<package/>").unwrap();
        fs::write(root.join("OEBPS").join("Text").join("0000.xhtml"), "<html/>").unwrap();
        fs::write(root.join("old.epub"), "stale").unwrap();

        let cursor = package_tree_to_writer(root, Cursor::new(Vec::new()), Some(9)).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();

        assert_eq!(names.len(), 4);
        assert_eq!(names[0], "mimetype");
        assert_eq!(names[1], "META-INF/container.xml");
        assert_eq!(names[2], "OEBPS/Text/0000.xhtml");
        assert_eq!(names[3], "OEBPS/content.opf");
        assert!(!names.iter().any(|n| n == "old.epub"));
    }
}
