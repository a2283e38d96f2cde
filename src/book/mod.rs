//! The in-memory book built from a text file.

/// Default `dc:language` for converted novels.
pub const DEFAULT_LANGUAGE: &str = "zh-CN";

/// A book ready for EPUB generation.
///
/// Built once per conversion and not modified after segmentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    pub metadata: Metadata,
    pub chapters: Vec<Chapter>,
}

/// Book metadata written to the package document and NCX.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub author: String,
    pub language: String,
    /// Empty means "derive from title and author", see [`Metadata::identifier`].
    pub identifier: String,
}

/// One chapter: its title line and body paragraphs, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub body: Vec<String>,
}

impl Book {
    pub fn new(metadata: Metadata, chapters: Vec<Chapter>) -> Self {
        Self { metadata, chapters }
    }
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// The package's unique identifier.
    ///
    /// Uses the explicit identifier when set, otherwise a name-based UUID
    /// (SHA-1, version 5 layout) over title and author, so converting the
    /// same book twice yields the same identifier.
    pub fn identifier(&self) -> String {
        if !self.identifier.is_empty() {
            return self.identifier.clone();
        }

        let mut hasher = sha1_smol::Sha1::new();
        hasher.update(self.title.as_bytes());
        hasher.update(&[0]);
        hasher.update(self.author.as_bytes());
        let digest = hasher.digest().bytes();

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        bytes[6] = (bytes[6] & 0x0f) | 0x50;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;

        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        format!(
            "urn:uuid:{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }

    /// `dc:language`, falling back to [`DEFAULT_LANGUAGE`].
    pub fn language(&self) -> &str {
        if self.language.is_empty() {
            DEFAULT_LANGUAGE
        } else {
            &self.language
        }
    }
}

impl Chapter {
    pub fn new(title: impl Into<String>, body: Vec<String>) -> Self {
        Self {
            title: title.into(),
            body,
        }
    }
}
