//! Chapter title detection.
//!
//! Detection is line-local: a line is judged on its own text with no
//! lookahead or lookbehind. A body line that happens to start with
//! `"12 "` is therefore taken as a title. That is an accepted limitation
//! of the heuristic.

use regex::Regex;

use super::patterns::{HEADING_RE, MARKED_UNIT_RE, NUMBERED_RE, VOLUME_UNIT_RE};

/// Which title rule matched a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleRule {
    /// `第十章`, `终章`
    MarkedUnit,
    /// `125 走向未来`
    Numbered,
    /// `卷一`, `第两百回`
    VolumeUnit,
    /// `# 序章`, `第 3 章`
    Heading,
}

impl TitleRule {
    /// Rules in evaluation order. Any match wins, so order only decides
    /// which rule gets reported.
    pub const ALL: [TitleRule; 4] = [
        TitleRule::MarkedUnit,
        TitleRule::Numbered,
        TitleRule::VolumeUnit,
        TitleRule::Heading,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            TitleRule::MarkedUnit => &MARKED_UNIT_RE,
            TitleRule::Numbered => &NUMBERED_RE,
            TitleRule::VolumeUnit => &VOLUME_UNIT_RE,
            TitleRule::Heading => &HEADING_RE,
        }
    }

    pub fn matches(self, line: &str) -> bool {
        self.pattern().is_match(line)
    }
}

/// Return the first rule classifying `line` as a chapter title.
pub fn title_rule(line: &str) -> Option<TitleRule> {
    TitleRule::ALL.into_iter().find(|rule| rule.matches(line))
}

/// Is `line` a chapter title?
pub fn is_chapter_title(line: &str) -> bool {
    title_rule(line).is_some()
}
