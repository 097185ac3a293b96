//! Steganography indicator scan.
//!
//! Byte-level heuristics only: known tool/editor markers and data appended
//! past the format's end-of-image marker. Indicators flag material for
//! manual review; they are not proof of a hidden payload.

use crate::format::ImageKind;
use crate::metadata::StegoScan;

const NO_MARKERS: &str = "No obvious steganography markers detected";

/// Scan raw file bytes for steganography indicators.
pub fn scan(bytes: &[u8], kind: ImageKind) -> StegoScan {
    let mut indicators = Vec::new();
    let mut suspicious = false;

    if contains(bytes, b"Photoshop") {
        indicators.push("Photoshop editing signature found".to_string());
    }
    if contains_ignore_case(bytes, b"steghide") {
        indicators.push("Steghide tool marker found".to_string());
        suspicious = true;
    } else if contains_ignore_case(bytes, b"steg") {
        indicators.push("Possible steganography marker found ('steg')".to_string());
        suspicious = true;
    }

    if let Some(trailing) = trailing_data_len(bytes, kind) {
        if trailing > 0 {
            indicators.push(format!(
                "{} bytes of data appended after the {} end marker",
                trailing,
                kind.label()
            ));
            suspicious = true;
        }
    }

    let summary = if indicators.is_empty() {
        NO_MARKERS.to_string()
    } else {
        indicators.join("; ")
    };

    StegoScan {
        indicators,
        suspicious,
        summary,
    }
}

/// Bytes following the end-of-image marker, when the format has one we can
/// locate. `None` when the marker is absent or the format has no fixed
/// trailer.
fn trailing_data_len(bytes: &[u8], kind: ImageKind) -> Option<usize> {
    match kind {
        ImageKind::Jpeg => {
            let eoi = rfind(bytes, &[0xFF, 0xD9])?;
            Some(bytes.len() - (eoi + 2))
        }
        ImageKind::Png => {
            // IEND chunk: type tag followed by a 4-byte CRC.
            let iend = rfind(bytes, b"IEND")?;
            let end = iend + 4 + 4;
            if end > bytes.len() {
                return None;
            }
            Some(bytes.len() - end)
        }
        _ => None,
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn contains_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|w| w.eq_ignore_ascii_case(needle))
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .rposition(|w| w == needle)
}
