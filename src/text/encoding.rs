//! Best-effort decoding of novel text of unknown encoding.
//!
//! Plain-text novels circulate in whatever encoding the uploader's editor
//! produced. Each [`Candidate`] is tried in priority order and the first one
//! that decodes without malformed sequences wins. When nothing fits, the
//! bytes pass through lossily and the result is marked undetermined.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::Encoding;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A candidate source encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Candidate {
    Utf8,
    Gbk,
    Big5,
    EucJp,
    EucKr,
    Utf16,
    Utf32,
}

impl Candidate {
    /// Fixed probing order: Unicode first, then legacy Chinese, then other
    /// CJK encodings, then the wide Unicode forms.
    pub const PRIORITY: [Candidate; 7] = [
        Candidate::Utf8,
        Candidate::Gbk,
        Candidate::Big5,
        Candidate::EucJp,
        Candidate::EucKr,
        Candidate::Utf16,
        Candidate::Utf32,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Candidate::Utf8 => "UTF-8",
            Candidate::Gbk => "GBK",
            Candidate::Big5 => "Big5",
            Candidate::EucJp => "EUC-JP",
            Candidate::EucKr => "EUC-KR",
            Candidate::Utf16 => "UTF-16",
            Candidate::Utf32 => "UTF-32",
        }
    }

    /// Decode `bytes` strictly, returning `None` on any malformed sequence.
    pub fn try_decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Candidate::Utf8 => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(body).ok().map(str::to_owned)
            }
            Candidate::Gbk => strict(encoding_rs::GBK, bytes),
            Candidate::Big5 => strict(encoding_rs::BIG5, bytes),
            Candidate::EucJp => strict(encoding_rs::EUC_JP, bytes),
            Candidate::EucKr => strict(encoding_rs::EUC_KR, bytes),
            Candidate::Utf16 => decode_utf16(bytes),
            Candidate::Utf32 => decode_utf32(bytes),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Text produced by [`normalize`] together with the encoding that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    /// `None` when no candidate decoded the input cleanly.
    pub encoding: Option<Candidate>,
}

impl Decoded {
    pub fn is_determined(&self) -> bool {
        self.encoding.is_some()
    }
}

/// Decode a chunk of bytes (a line or a whole file) with the first
/// candidate that accepts it.
///
/// Never fails: undecodable input is passed through with invalid sequences
/// replaced by U+FFFD.
pub fn normalize(bytes: &[u8]) -> Decoded {
    Candidate::PRIORITY
        .iter()
        .find_map(|&candidate| {
            candidate.try_decode(bytes).map(|text| Decoded {
                text,
                encoding: Some(candidate),
            })
        })
        .unwrap_or_else(|| Decoded {
            text: String::from_utf8_lossy(bytes).into_owned(),
            encoding: None,
        })
}

/// Decode a whole document.
///
/// The document is first decoded as a unit. If no candidate accepts it,
/// each line is normalized on its own so that a few stray bytes do not
/// garble the entire book; the result is then reported as undetermined.
pub fn normalize_document(bytes: &[u8]) -> Decoded {
    let whole = normalize(bytes);
    if whole.is_determined() {
        return whole;
    }

    let lines: Vec<String> = bytes
        .split(|&b| b == b'\n')
        .map(|line| normalize(line).text)
        .collect();

    Decoded {
        text: lines.join("\n"),
        encoding: None,
    }
}

fn strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

/// UTF-16 honouring a BOM, little-endian otherwise.
fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) if encoding != encoding_rs::UTF_8 => {
            (encoding, &bytes[bom_len..])
        }
        _ => (encoding_rs::UTF_16LE, bytes),
    };
    strict(encoding, body)
}

/// UTF-32 honouring a BOM, little-endian otherwise.
///
/// encoding_rs only implements the WHATWG encodings, which exclude UTF-32.
fn decode_utf32(bytes: &[u8]) -> Option<String> {
    let (body, big_endian) = match bytes {
        [0x00, 0x00, 0xFE, 0xFF, rest @ ..] => (rest, true),
        [0xFF, 0xFE, 0x00, 0x00, rest @ ..] => (rest, false),
        _ => (bytes, false),
    };
    if body.len() % 4 != 0 {
        return None;
    }

    body.chunks_exact(4)
        .map(|unit| {
            let unit = [unit[0], unit[1], unit[2], unit[3]];
            let scalar = if big_endian {
                u32::from_be_bytes(unit)
            } else {
                u32::from_le_bytes(unit)
            };
            char::from_u32(scalar)
        })
        .collect()
}
