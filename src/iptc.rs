//! IPTC-NAA metadata from JPEG APP13 segments.
//!
//! The IPTC block lives inside the Photoshop image-resource container:
//! APP13 segment -> "Photoshop 3.0" header -> 8BIM resource 0x0404 ->
//! 0x1C dataset records. Only record 2 (application record) datasets are
//! mapped; everything else is skipped.

use crate::metadata::IptcInfo;

const IPTC_RESOURCE_ID: u16 = 0x0404;
const RECORD_MARKER: u8 = 0x1C;
const APPLICATION_RECORD: u8 = 2;

/// Parse IPTC metadata from raw JPEG bytes. `None` when the file is not a
/// JPEG or carries no IPTC block.
pub fn extract(bytes: &[u8]) -> Option<IptcInfo> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            break;
        }
        let marker = bytes[pos + 1];
        match marker {
            // Standalone markers carry no length.
            0x01 | 0xD0..=0xD8 => {
                pos += 2;
                continue;
            }
            // Entropy-coded data follows SOS; metadata segments are behind us.
            0xD9 | 0xDA => break,
            _ => {}
        }
        let len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        if len < 2 || pos + 2 + len > bytes.len() {
            break;
        }
        let payload = &bytes[pos + 4..pos + 2 + len];
        if marker == 0xED {
            if let Some(block) = photoshop_iptc_block(payload) {
                let info = parse_records(block);
                if !info.is_empty() {
                    return Some(info);
                }
            }
        }
        pos += 2 + len;
    }
    None
}

/// Walk the 8BIM image resources and return the IPTC-NAA data block.
fn photoshop_iptc_block(payload: &[u8]) -> Option<&[u8]> {
    let rest = payload.strip_prefix(b"Photoshop 3.0\0")?;
    let mut pos = 0;
    while pos + 11 <= rest.len() {
        if &rest[pos..pos + 4] != b"8BIM" {
            break;
        }
        let resource_id = u16::from_be_bytes([rest[pos + 4], rest[pos + 5]]);
        let name_len = rest[pos + 6] as usize;
        // Pascal string, padded so the length byte plus name is even.
        let mut name_total = 1 + name_len;
        if name_total % 2 == 1 {
            name_total += 1;
        }
        let size_pos = pos + 6 + name_total;
        if size_pos + 4 > rest.len() {
            break;
        }
        let size = u32::from_be_bytes([
            rest[size_pos],
            rest[size_pos + 1],
            rest[size_pos + 2],
            rest[size_pos + 3],
        ]) as usize;
        let data_pos = size_pos + 4;
        if data_pos + size > rest.len() {
            break;
        }
        if resource_id == IPTC_RESOURCE_ID {
            return Some(&rest[data_pos..data_pos + size]);
        }
        let mut advance = size;
        if advance % 2 == 1 {
            advance += 1;
        }
        pos = data_pos + advance;
    }
    None
}

fn parse_records(data: &[u8]) -> IptcInfo {
    let mut info = IptcInfo::default();
    let mut pos = 0;
    while pos + 5 <= data.len() {
        if data[pos] != RECORD_MARKER {
            break;
        }
        let record = data[pos + 1];
        let dataset = data[pos + 2];
        let len = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as usize;
        // Extended datasets (high bit set) are not used by the fields we map.
        if len & 0x8000 != 0 {
            break;
        }
        let start = pos + 5;
        if start + len > data.len() {
            break;
        }
        let value = String::from_utf8_lossy(&data[start..start + len])
            .trim()
            .to_string();
        if record == APPLICATION_RECORD && !value.is_empty() {
            match dataset {
                5 => info.title = Some(value),
                25 => info.keywords.push(value),
                55 => info.date_created = Some(value),
                80 => info.byline = Some(value),
                90 => info.city = Some(value),
                95 => info.state = Some(value),
                101 => info.country = Some(value),
                105 => info.headline = Some(value),
                110 => info.credit = Some(value),
                115 => info.source = Some(value),
                116 => info.copyright = Some(value),
                120 => info.caption = Some(value),
                _ => {}
            }
        }
        pos = start + len;
    }
    info
}
