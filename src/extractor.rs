//! EXIF metadata extraction.
//!
//! Adapter over the `exif` crate turning raw fields into the report
//! categories: camera, device, date/time, GPS, and the curated set of
//! additional tags. Every field is read independently so a single odd tag
//! never fails the whole extraction.

use crate::metadata::{CameraInfo, DateInfo, DeviceInfo, ExifField, GpsInfo};
use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use lazy_static::lazy_static;
use regex::Regex;
use std::io::Cursor;
use url::Url;

pub struct ExtractedExif {
    pub camera: Option<CameraInfo>,
    pub device: Option<DeviceInfo>,
    pub dates: Option<DateInfo>,
    pub gps: Option<GpsInfo>,
    pub extra: Vec<ExifField>,
    pub thumbnail_present: bool,
    pub warnings: Vec<String>,
}

impl ExtractedExif {
    fn empty(warnings: Vec<String>) -> Self {
        ExtractedExif {
            camera: None,
            device: None,
            dates: None,
            gps: None,
            extra: Vec::new(),
            thumbnail_present: false,
            warnings,
        }
    }
}

/// Extract all EXIF-derived categories from raw file bytes.
pub fn extract(bytes: &[u8]) -> ExtractedExif {
    let mut cursor = Cursor::new(bytes);
    let exif = match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(e) => {
            log::debug!("No EXIF data: {}", e);
            return ExtractedExif::empty(vec![format!("No EXIF metadata found ({})", e)]);
        }
    };

    let mut warnings = Vec::new();

    let camera = extract_camera(&exif);
    let device = camera
        .as_ref()
        .and_then(|c| c.model.as_deref())
        .and_then(detect_device);
    let dates = extract_dates(&exif);
    let gps = extract_gps(&exif, &mut warnings);
    let extra = extract_additional(&exif);
    let thumbnail_present = exif.fields().any(|f| f.ifd_num == In::THUMBNAIL);

    ExtractedExif {
        camera: camera.filter(|c| !c.is_empty()),
        device,
        dates: dates.filter(|d| !d.is_empty()),
        gps,
        extra,
        thumbnail_present,
        warnings,
    }
}

fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(v) => v
            .first()
            .map(|b| String::from_utf8_lossy(b).trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => Some(field.display_value().to_string()),
    }
}

fn display_field(exif: &Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY)
        .map(|f| f.display_value().to_string())
        .filter(|s| !s.is_empty())
}

fn first_rational(exif: &Exif, tag: Tag) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Rational(v) => v.first().map(|r| r.to_f64()),
        _ => None,
    }
}

fn extract_camera(exif: &Exif) -> Option<CameraInfo> {
    let mut camera = CameraInfo {
        manufacturer: ascii_field(exif, Tag::Make),
        model: ascii_field(exif, Tag::Model),
        software: ascii_field(exif, Tag::Software),
        exif_version: display_field(exif, Tag::ExifVersion),
        body_serial_number: ascii_field(exif, Tag::BodySerialNumber),
        lens_model: ascii_field(exif, Tag::LensModel),
        exposure_time: None,
        aperture: None,
        iso_speed: None,
        focal_length: None,
        flash: None,
    };

    camera.exposure_time =
        display_field(exif, Tag::ExposureTime).map(|v| format!("{} sec", v));
    camera.aperture = first_rational(exif, Tag::FNumber)
        .map(|f| format!("f/{:.1}", f))
        .or_else(|| display_field(exif, Tag::FNumber));
    camera.iso_speed = display_field(exif, Tag::PhotographicSensitivity);
    camera.focal_length = first_rational(exif, Tag::FocalLength)
        .map(|f| format!("{:.1} mm", f))
        .or_else(|| display_field(exif, Tag::FocalLength));
    camera.flash = exif
        .get_field(Tag::Flash, In::PRIMARY)
        .and_then(|f| match &f.value {
            Value::Short(v) => v.first().map(|code| flash_description(*code)),
            _ => Some(f.display_value().to_string()),
        });

    Some(camera)
}

fn extract_dates(exif: &Exif) -> Option<DateInfo> {
    Some(DateInfo {
        capture_time: ascii_field(exif, Tag::DateTime).map(|v| format_exif_time(&v)),
        original_capture_time: ascii_field(exif, Tag::DateTimeOriginal)
            .map(|v| format_exif_time(&v)),
        digitization_time: ascii_field(exif, Tag::DateTimeDigitized)
            .map(|v| format_exif_time(&v)),
        subsecond_time: ascii_field(exif, Tag::SubSecTimeOriginal),
    })
}

fn extract_gps(exif: &Exif, warnings: &mut Vec<String>) -> Option<GpsInfo> {
    let lat = dms_field(exif, Tag::GPSLatitude);
    let lon = dms_field(exif, Tag::GPSLongitude);

    let (lat, lon) = match (lat, lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        (None, None) => return None,
        _ => {
            warnings.push("Incomplete GPS coordinates in EXIF data".to_string());
            return None;
        }
    };

    let lat = match ascii_field(exif, Tag::GPSLatitudeRef).as_deref() {
        Some(r) if !r.eq_ignore_ascii_case("N") => -lat,
        _ => lat,
    };
    let lon = match ascii_field(exif, Tag::GPSLongitudeRef).as_deref() {
        Some(r) if !r.eq_ignore_ascii_case("E") => -lon,
        _ => lon,
    };

    let altitude = first_rational(exif, Tag::GPSAltitude).map(|alt| {
        let below_sea_level = exif
            .get_field(Tag::GPSAltitudeRef, In::PRIMARY)
            .map(|f| matches!(&f.value, Value::Byte(v) if v.first() == Some(&1)))
            .unwrap_or(false);
        let alt = if below_sea_level { -alt } else { alt };
        format!("{:.1} meters", alt)
    });

    let timestamp = match (
        ascii_field(exif, Tag::GPSDateStamp),
        display_field(exif, Tag::GPSTimeStamp),
    ) {
        (Some(date), Some(time)) => Some(format!("{} {}", date, time)),
        (None, Some(time)) => Some(time),
        (Some(date), None) => Some(date),
        (None, None) => None,
    };

    let direction = first_rational(exif, Tag::GPSImgDirection).map(|d| format!("{:.1}°", d));

    Some(GpsInfo {
        latitude: (lat * 1e6).round() / 1e6,
        longitude: (lon * 1e6).round() / 1e6,
        google_maps_link: maps_link(lat, lon),
        openstreetmap_link: osm_link(lat, lon),
        altitude,
        timestamp,
        direction,
    })
}

/// Degrees/minutes/seconds rationals to decimal degrees.
fn dms_field(exif: &Exif, tag: Tag) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Rational(parts) if !parts.is_empty() => {
            let deg = parts[0].to_f64();
            let min = parts.get(1).map(|r| r.to_f64()).unwrap_or(0.0);
            let sec = parts.get(2).map(|r| r.to_f64()).unwrap_or(0.0);
            Some(deg + min / 60.0 + sec / 3600.0)
        }
        _ => None,
    }
}

fn maps_link(lat: f64, lon: f64) -> String {
    Url::parse_with_params(
        "https://maps.google.com/",
        &[("q", format!("{:.6},{:.6}", lat, lon))],
    )
    .map(|u| u.to_string())
    .unwrap_or_default()
}

fn osm_link(lat: f64, lon: f64) -> String {
    Url::parse_with_params(
        "https://www.openstreetmap.org/",
        &[
            ("mlat", format!("{:.6}", lat)),
            ("mlon", format!("{:.6}", lon)),
        ],
    )
    .map(|u| u.to_string())
    .unwrap_or_default()
}

/// EXIF datetime string ("2021:06:01 12:30:00") to a readable form.
/// Unparseable values pass through untouched.
pub fn format_exif_time(raw: &str) -> String {
    let raw = raw.trim();
    for fmt in ["%Y:%m:%d %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.format("%B %d, %Y at %H:%M:%S").to_string();
        }
    }
    raw.to_string()
}

const ADDITIONAL_TAGS: [(Tag, &str); 14] = [
    (Tag::Orientation, "Orientation"),
    (Tag::LightSource, "Light Source"),
    (Tag::ExposureProgram, "Exposure Program"),
    (Tag::MeteringMode, "Metering Mode"),
    (Tag::WhiteBalance, "White Balance"),
    (Tag::SceneCaptureType, "Scene Type"),
    (Tag::LensSerialNumber, "Lens Serial"),
    (Tag::Contrast, "Contrast"),
    (Tag::Saturation, "Saturation"),
    (Tag::Sharpness, "Sharpness"),
    (Tag::DigitalZoomRatio, "Digital Zoom"),
    (Tag::ExposureBiasValue, "Exposure Bias"),
    (Tag::MaxApertureValue, "Max Aperture"),
    (Tag::FocalLengthIn35mmFilm, "35mm Equivalent Focal Length"),
];

fn extract_additional(exif: &Exif) -> Vec<ExifField> {
    ADDITIONAL_TAGS
        .iter()
        .filter_map(|(tag, name)| {
            display_field(exif, *tag).map(|value| ExifField {
                tag: name.to_string(),
                value,
            })
        })
        .collect()
}

lazy_static! {
    static ref PHONE_PATTERNS: Vec<(&'static str, &'static str, Regex)> = vec![
        ("iPhone", "iOS", Regex::new(r"(?i)iPhone\s*([0-9]+[a-zA-Z ]*\w)?").unwrap()),
        ("iPad", "iOS", Regex::new(r"(?i)iPad\s*([0-9]+[a-zA-Z]*)?").unwrap()),
        ("Samsung", "Android", Regex::new(r"(?i)(?:Samsung[-\s]*)?(Galaxy\s*[A-Za-z0-9+]+)").unwrap()),
        ("Samsung", "Android", Regex::new(r"(?i)SM-([A-Z][0-9]+[A-Z]*)").unwrap()),
        ("Huawei", "Android", Regex::new(r"(?i)Huawei[-\s]*([A-Za-z0-9 ]+)").unwrap()),
        ("Xiaomi", "Android", Regex::new(r"(?i)Xiaomi[-\s]*((?:Mi|Redmi)\s*[A-Za-z0-9 ]+)").unwrap()),
        ("Google", "Android", Regex::new(r"(?i)(Pixel\s*[0-9]+[a-zA-Z ]*\w|Pixel)").unwrap()),
        ("OnePlus", "Android", Regex::new(r"(?i)OnePlus[-\s]*([0-9]+[A-Za-z]*)").unwrap()),
        ("Sony", "Android", Regex::new(r"(?i)(Xperia\s*[A-Za-z0-9 ]+)").unwrap()),
        ("Motorola", "Android", Regex::new(r"(?i)Moto[-\s]*([A-Za-z0-9 ]+)").unwrap()),
    ];
}

/// Guess a smartphone identity from the EXIF camera model string.
pub fn detect_device(model: &str) -> Option<DeviceInfo> {
    for (brand, os, pattern) in PHONE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(model) {
            let detail = caps
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| model.trim().to_string());
            return Some(DeviceInfo {
                device_type: "Smartphone".to_string(),
                brand: brand.to_string(),
                model: detail,
                operating_system: os.to_string(),
            });
        }
    }
    None
}

/// EXIF flash code to description, the full table of flash states.
pub fn flash_description(code: u16) -> String {
    let known = match code {
        0x00 => Some("No Flash"),
        0x01 => Some("Fired"),
        0x05 => Some("Fired, Return not detected"),
        0x07 => Some("Fired, Return detected"),
        0x08 => Some("On, Did not fire"),
        0x09 => Some("On, Fired"),
        0x0D => Some("On, Return not detected"),
        0x0F => Some("On, Return detected"),
        0x10 => Some("Off, Did not fire"),
        0x14 => Some("Off, Did not fire, Return not detected"),
        0x18 => Some("Auto, Did not fire"),
        0x19 => Some("Auto, Fired"),
        0x1D => Some("Auto, Fired, Return not detected"),
        0x1F => Some("Auto, Fired, Return detected"),
        0x20 => Some("No flash function"),
        0x30 => Some("Off, No flash function"),
        0x41 => Some("Fired, Red-eye reduction"),
        0x45 => Some("Fired, Red-eye reduction, Return not detected"),
        0x47 => Some("Fired, Red-eye reduction, Return detected"),
        0x49 => Some("On, Red-eye reduction"),
        0x4D => Some("On, Red-eye reduction, Return not detected"),
        0x4F => Some("On, Red-eye reduction, Return detected"),
        0x50 => Some("Off, Red-eye reduction"),
        0x58 => Some("Auto, Did not fire, Red-eye reduction"),
        0x59 => Some("Auto, Fired, Red-eye reduction"),
        0x5D => Some("Auto, Fired, Red-eye reduction, Return not detected"),
        0x5F => Some("Auto, Fired, Red-eye reduction, Return detected"),
        _ => None,
    };
    match known {
        Some(text) => text.to_string(),
        None => format!("Unknown (Value: {})", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exif_time_formats() {
        assert_eq!(
            format_exif_time("2021:06:01 12:30:00"),
            "June 01, 2021 at 12:30:00"
        );
        assert_eq!(
            format_exif_time("2021-06-01 12:30:00"),
            "June 01, 2021 at 12:30:00"
        );
        assert_eq!(format_exif_time("not a date"), "not a date");
    }

    #[test]
    fn flash_table_lookup() {
        assert_eq!(flash_description(0x00), "No Flash");
        assert_eq!(flash_description(0x19), "Auto, Fired");
        assert_eq!(flash_description(0x5F), "Auto, Fired, Red-eye reduction, Return detected");
        assert_eq!(flash_description(0x99), "Unknown (Value: 153)");
    }

    #[test]
    fn device_detection() {
        let iphone = detect_device("iPhone 13 Pro").unwrap();
        assert_eq!(iphone.brand, "iPhone");
        assert_eq!(iphone.operating_system, "iOS");

        let pixel = detect_device("Pixel 7").unwrap();
        assert_eq!(pixel.brand, "Google");
        assert_eq!(pixel.operating_system, "Android");

        let galaxy = detect_device("Samsung Galaxy S21").unwrap();
        assert_eq!(galaxy.brand, "Samsung");
        assert_eq!(galaxy.model, "Galaxy S21");

        assert!(detect_device("NIKON D750").is_none());
    }

    #[test]
    fn no_exif_degrades_with_warning() {
        let extracted = extract(b"definitely not an image");
        assert!(extracted.camera.is_none());
        assert!(extracted.gps.is_none());
        assert!(!extracted.warnings.is_empty());
    }

    #[test]
    fn map_links_carry_coordinates() {
        let link = maps_link(48.858844, 2.294351);
        assert!(link.starts_with("https://maps.google.com/"));
        assert!(link.contains("48.858844"));
        let osm = osm_link(-33.856784, 151.215297);
        assert!(osm.contains("mlat=-33.856784"));
        assert!(osm.contains("mlon=151.215297"));
    }
}
