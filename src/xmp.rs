//! XMP metadata extraction.
//!
//! Locates the serialized XMP packet (`<x:xmpmeta> ... </x:xmpmeta>`) in the
//! raw file bytes and walks the RDF with a streaming XML reader. Properties
//! come out as ordered name/value pairs: attributes on `rdf:Description`,
//! simple property elements, and `rdf:li` list items.

use crate::metadata::ExifField;
use quick_xml::events::Event;
use quick_xml::Reader;

const PACKET_START: &[u8] = b"<x:xmpmeta";
const PACKET_END: &[u8] = b"</x:xmpmeta>";

pub struct XmpExtraction {
    pub properties: Vec<ExifField>,
    pub warning: Option<String>,
}

impl XmpExtraction {
    fn empty() -> Self {
        XmpExtraction {
            properties: Vec::new(),
            warning: None,
        }
    }
}

/// Extract XMP properties from raw file bytes. Absence of a packet is not an
/// error; malformed XML inside one yields a warning plus whatever parsed.
pub fn extract(bytes: &[u8]) -> XmpExtraction {
    let packet = match locate_packet(bytes) {
        Some(p) => p,
        None => return XmpExtraction::empty(),
    };
    let xml = String::from_utf8_lossy(packet);
    parse_packet(&xml)
}

fn locate_packet(bytes: &[u8]) -> Option<&[u8]> {
    let start = find(bytes, PACKET_START)?;
    let end = find(&bytes[start..], PACKET_END)? + start + PACKET_END.len();
    Some(&bytes[start..end])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// A property element is namespaced with anything other than the RDF/XMP
/// envelope prefixes.
fn is_property(name: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, _)) => prefix != "rdf" && prefix != "x",
        None => false,
    }
}

fn description_attributes(e: &quick_xml::events::BytesStart, out: &mut Vec<ExifField>) {
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        if key.starts_with("xmlns") || !is_property(&key) {
            continue;
        }
        if let Ok(value) = attr.unescape_value() {
            let value = value.trim().to_string();
            if !value.is_empty() {
                out.push(ExifField { tag: key, value });
            }
        }
    }
}

fn parse_packet(xml: &str) -> XmpExtraction {
    let mut reader = Reader::from_str(xml);
    let mut properties = Vec::new();
    let mut warning = None;
    let mut stack: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "rdf:Description" {
                    description_attributes(&e, &mut properties);
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "rdf:Description" {
                    description_attributes(&e, &mut properties);
                }
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(t)) => {
                if let Ok(text) = t.unescape() {
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        if let Some(prop) = stack.iter().rev().find(|n| is_property(n)) {
                            properties.push(ExifField {
                                tag: prop.clone(),
                                value: text,
                            });
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warning = Some(format!("XMP parse error: {}", e));
                break;
            }
            Ok(_) => {}
        }
    }

    XmpExtraction {
        properties,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:xmp="http://ns.adobe.com/xap/1.0/"
        xmlns:dc="http://purl.org/dc/elements/1.1/"
        xmp:CreatorTool="Adobe Photoshop 23.0">
      <xmp:CreateDate>2023-04-01T10:00:00</xmp:CreateDate>
      <dc:subject>
        <rdf:Bag>
          <rdf:li>forensics</rdf:li>
          <rdf:li>metadata</rdf:li>
        </rdf:Bag>
      </dc:subject>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>"#;

    fn value_of<'a>(fields: &'a [ExifField], tag: &str) -> Vec<&'a str> {
        fields
            .iter()
            .filter(|f| f.tag == tag)
            .map(|f| f.value.as_str())
            .collect()
    }

    #[test]
    fn parses_attributes_elements_and_lists() {
        let mut bytes = b"garbage before ".to_vec();
        bytes.extend_from_slice(SAMPLE.as_bytes());
        bytes.extend_from_slice(b" garbage after");

        let extraction = extract(&bytes);
        assert!(extraction.warning.is_none());
        assert_eq!(
            value_of(&extraction.properties, "xmp:CreatorTool"),
            vec!["Adobe Photoshop 23.0"]
        );
        assert_eq!(
            value_of(&extraction.properties, "xmp:CreateDate"),
            vec!["2023-04-01T10:00:00"]
        );
        assert_eq!(
            value_of(&extraction.properties, "dc:subject"),
            vec!["forensics", "metadata"]
        );
    }

    #[test]
    fn no_packet_is_empty_not_error() {
        let extraction = extract(b"\xFF\xD8\xFF\xD9");
        assert!(extraction.properties.is_empty());
        assert!(extraction.warning.is_none());
    }

    #[test]
    fn malformed_packet_yields_warning() {
        let xml = b"<x:xmpmeta><rdf:Description about='x'></x:xmpmeta>";
        let extraction = extract(xml);
        assert!(extraction.warning.is_some());
    }
}
