//! Cached regex patterns for chapter title detection.
//!
//! Uses LazyLock to compile patterns once on first use. The `regex` crate
//! is used rather than `regex-lite` because `\s` must match full-width
//! spaces (U+3000), which are common in Chinese novel text.

use regex::Regex;
use std::sync::LazyLock;

/// `第`/`终` marker, numerals (CJK or Arabic, spaces allowed), unit word.
/// Matches "第十章", "终章", "第 一 百 零 一 卷".
pub static MARKED_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[第终][0123456789一二三四五六七八九十百千万零 　\s]*[章部集节卷]").unwrap()
});

/// Up to four ASCII digits followed by a space: "125 走向未来".
pub static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,4} ").unwrap());

/// Volume or chapter marker with compact numerals, then any text.
/// Matches "卷一章", "第两百回 大结局", "第〇节".
pub static VOLUME_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[第终卷][0123456789一二三四五六七八九十零〇百千两]*[章回部节集卷]").unwrap()
});

/// Markdown heading ("## 序") or a bounded "第 N 章" phrase.
pub static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ 　\t]*((\s*#+ )|(第\s*[0-9零一二三四五六七八九十百]{1,6}\s*[卷章节回]))").unwrap()
});
