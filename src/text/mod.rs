//! Text side of the pipeline: decoding, title detection and segmentation.

pub mod detect;
pub mod encoding;
mod patterns;
pub mod segment;

pub use detect::{TitleRule, is_chapter_title, title_rule};
pub use encoding::{Candidate, Decoded, normalize, normalize_document};
pub use segment::{
    FRONT_MATTER_TITLE, Segmenter, close_pending, is_xml_char, segment_lines, segment_text,
    strip_control_chars,
};
