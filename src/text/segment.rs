//! Splitting a stream of lines into chapters.

use std::borrow::Cow;

use tracing::debug;

use crate::book::Chapter;

use super::detect::is_chapter_title;

/// Title given to content that precedes the first detected chapter title.
pub const FRONT_MATTER_TITLE: &str = "前言";

/// Incremental chapter segmenter.
///
/// Feed trimmed, non-blank lines with [`push_line`](Self::push_line) and
/// collect the result with [`finish`](Self::finish). [`segment_lines`] and
/// [`segment_text`] wrap the common cases.
#[derive(Debug, Default)]
pub struct Segmenter {
    chapters: Vec<Chapter>,
    title: Option<String>,
    body: Vec<String>,
    front_matter_emitted: bool,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) {
        if is_chapter_title(line) {
            let body = std::mem::take(&mut self.body);
            let pending = self.title.take();
            if let Some(chapter) = close_pending(pending, body, &mut self.front_matter_emitted) {
                debug!(title = %chapter.title, paragraphs = chapter.body.len(), "chapter closed");
                self.chapters.push(chapter);
            }
            self.title = Some(line.to_string());
        } else {
            self.body.push(line.to_string());
        }
    }

    /// Flush the last chapter. Always yields at least one chapter: input
    /// without any title becomes a single chapter with an empty title.
    pub fn finish(mut self) -> Vec<Chapter> {
        let title = self.title.take().unwrap_or_default();
        self.chapters.push(Chapter::new(title, self.body));
        self.chapters
    }
}

/// Decide what to emit when a new title closes the pending chapter.
///
/// - A pending title closes as `(title, body)`.
/// - Content before the first title becomes the front matter chapter,
///   at most once.
/// - A title on the first content line closes nothing.
pub fn close_pending(
    pending_title: Option<String>,
    body: Vec<String>,
    front_matter_emitted: &mut bool,
) -> Option<Chapter> {
    match pending_title {
        Some(title) => Some(Chapter::new(title, body)),
        None if !body.is_empty() && !*front_matter_emitted => {
            *front_matter_emitted = true;
            Some(Chapter::new(FRONT_MATTER_TITLE, body))
        }
        None => None,
    }
}

/// Can `c` appear in an XML 1.0 document?
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Remove characters XML 1.0 forbids, such as the Ctrl-Z end-of-file
/// marker of DOS-era text files.
pub fn strip_control_chars(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

/// Segment already-normalized lines. Lines are cleaned of control
/// characters and trimmed; lines left blank are skipped before
/// classification.
pub fn segment_lines<I, S>(lines: I) -> Vec<Chapter>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut segmenter = Segmenter::new();
    for line in lines {
        let line = strip_control_chars(line.as_ref());
        let line = line.trim();
        if !line.is_empty() {
            segmenter.push_line(line);
        }
    }
    segmenter.finish()
}

/// Segment a whole decoded document.
pub fn segment_text(text: &str) -> Vec<Chapter> {
    segment_lines(text.lines())
}
