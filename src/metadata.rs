// src/metadata.rs

use serde::{Deserialize, Serialize};

/// A single named metadata value, kept in source order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExifField {
    pub tag: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FileInfo {
    pub file_name: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    pub file_size: String,
    pub file_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
    pub file_type: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageProperties {
    pub width: u32,
    pub height: u32,
    pub megapixels: String,
    pub aspect_ratio: String,
    pub color_type: String,
    pub bits_per_pixel: u16,
    pub has_transparency: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CameraInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exif_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lens_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aperture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso_speed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
}

impl CameraInfo {
    pub fn is_empty(&self) -> bool {
        self.manufacturer.is_none()
            && self.model.is_none()
            && self.software.is_none()
            && self.exif_version.is_none()
            && self.body_serial_number.is_none()
            && self.lens_model.is_none()
            && self.exposure_time.is_none()
            && self.aperture.is_none()
            && self.iso_speed.is_none()
            && self.focal_length.is_none()
            && self.flash.is_none()
    }
}

/// Smartphone identity inferred from the EXIF model string.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeviceInfo {
    pub device_type: String,
    pub brand: String,
    pub model: String,
    pub operating_system: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DateInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_capture_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digitization_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsecond_time: Option<String>,
}

impl DateInfo {
    pub fn is_empty(&self) -> bool {
        self.capture_time.is_none()
            && self.original_capture_time.is_none()
            && self.digitization_time.is_none()
            && self.subsecond_time.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GpsInfo {
    pub latitude: f64,
    pub longitude: f64,
    pub google_maps_link: String,
    pub openstreetmap_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct IptcInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub keywords: Vec<String>,
}

impl IptcInfo {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.headline.is_none()
            && self.caption.is_none()
            && self.byline.is_none()
            && self.credit.is_none()
            && self.source.is_none()
            && self.copyright.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.country.is_none()
            && self.date_created.is_none()
            && self.keywords.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HashDigest {
    pub algorithm: String,
    pub digest: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ElaResult {
    pub quality: u8,
    pub mean_difference: f64,
    pub rms_difference: f64,
    pub max_difference: u8,
    pub assessment: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StegoScan {
    pub indicators: Vec<String>,
    pub suspicious: bool,
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForensicFindings {
    #[serde(rename = "File Integrity")]
    pub hashes: Vec<HashDigest>,
    #[serde(rename = "Error Level Analysis", skip_serializing_if = "Option::is_none")]
    pub ela: Option<ElaResult>,
    #[serde(rename = "Steganography Indicators")]
    pub stego: StegoScan,
    #[serde(rename = "Thumbnail Present")]
    pub thumbnail_present: bool,
}

/// The full analysis record for one image. Serialized category order is the
/// declaration order; absent categories are omitted.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalysisReport {
    #[serde(rename = "File Information")]
    pub file_info: FileInfo,
    #[serde(rename = "Image Properties", skip_serializing_if = "Option::is_none")]
    pub image_properties: Option<ImageProperties>,
    #[serde(rename = "Camera Information", skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraInfo>,
    #[serde(rename = "Device Information", skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceInfo>,
    #[serde(rename = "Date & Time Information", skip_serializing_if = "Option::is_none")]
    pub dates: Option<DateInfo>,
    #[serde(rename = "GPS Data", skip_serializing_if = "Option::is_none")]
    pub gps: Option<GpsInfo>,
    #[serde(rename = "Additional EXIF Data", skip_serializing_if = "Vec::is_empty", default)]
    pub exif_extra: Vec<ExifField>,
    #[serde(rename = "IPTC", skip_serializing_if = "Option::is_none")]
    pub iptc: Option<IptcInfo>,
    #[serde(rename = "XMP", skip_serializing_if = "Vec::is_empty", default)]
    pub xmp: Vec<ExifField>,
    #[serde(rename = "Forensic Analysis")]
    pub forensics: ForensicFindings,
    #[serde(rename = "Warnings", skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

/// Human-readable byte size, binary units.
pub fn human_readable_size(size_bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = size_bytes as f64;
    for unit in &UNITS {
        if size < 1024.0 {
            if *unit == "B" {
                return format!("{} {}", size_bytes, unit);
            }
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} PB", size)
}
