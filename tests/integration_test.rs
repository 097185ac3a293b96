//! Integration tests for the complete analysis pipeline:
//! - synthetic image fixtures end to end
//! - hash digests against independently computed references
//! - JSON/TXT export parity (lossless projection of the same record)
//! - malformed input handling

use image_forensics::config::AppConfig;
use image_forensics::error::AppError;
use image_forensics::exporter::export_report;
use image_forensics::metadata::AnalysisReport;
use image_forensics::processor::analyze_file;
use image_forensics::report::{writers_for, ReportWriter};
use image_forensics::report_writers::{json::JsonReportWriter, text::TextReportWriter};

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, Rgb, RgbImage};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "image_forensics_it_{}_{}",
        name,
        std::process::id()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn sample_image() -> RgbImage {
    RgbImage::from_fn(80, 60, |x, y| {
        Rgb([(x * 3) as u8, (y * 4) as u8, ((x + y) * 2) as u8])
    })
}

fn write_sample_png(dir: &PathBuf) -> PathBuf {
    let path = dir.join("sample.png");
    sample_image().save(&path).unwrap();
    path
}

fn write_sample_jpeg(dir: &PathBuf) -> PathBuf {
    let path = dir.join("sample.jpg");
    let img = sample_image();
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, 85);
    encoder
        .encode(img.as_raw(), img.width(), img.height(), ColorType::Rgb8)
        .unwrap();
    fs::write(&path, &bytes).unwrap();
    path
}

// ============================================================================
// End-to-end analysis
// ============================================================================

#[test]
fn png_pipeline_produces_complete_report() {
    let dir = temp_dir("png_pipeline");
    let path = write_sample_png(&dir);

    let report = analyze_file(&AppConfig::default(), &path).unwrap();

    assert_eq!(report.file_info.file_type, "PNG");
    assert_eq!(report.file_info.file_name, "sample.png");
    assert_eq!(report.file_info.file_size_bytes, fs::metadata(&path).unwrap().len());

    let props = report.image_properties.as_ref().unwrap();
    assert_eq!((props.width, props.height), (80, 60));
    assert!(!props.has_transparency);

    let ela = report.forensics.ela.as_ref().unwrap();
    assert!(ela.mean_difference >= 0.0);
    assert_eq!(ela.quality, AppConfig::default().ela.quality);
}

#[test]
fn sha256_matches_independent_computation() {
    let dir = temp_dir("sha_reference");
    let path = write_sample_jpeg(&dir);
    let bytes = fs::read(&path).unwrap();

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let expected = format!("{:x}", hasher.finalize());

    let report = analyze_file(&AppConfig::default(), &path).unwrap();
    let sha256 = report
        .forensics
        .hashes
        .iter()
        .find(|h| h.algorithm == "SHA256")
        .unwrap();
    assert_eq!(sha256.digest, expected);
}

#[test]
fn ela_score_is_stable_across_runs() {
    let dir = temp_dir("ela_stable");
    let path = write_sample_jpeg(&dir);
    let config = AppConfig::default();

    let first = analyze_file(&config, &path).unwrap();
    let second = analyze_file(&config, &path).unwrap();
    let a = first.forensics.ela.unwrap();
    let b = second.forensics.ela.unwrap();
    assert_eq!(a.mean_difference, b.mean_difference);
    assert_eq!(a.rms_difference, b.rms_difference);
    assert_eq!(a.max_difference, b.max_difference);
}

#[test]
fn appended_payload_is_flagged() {
    let dir = temp_dir("trailing");
    let clean = write_sample_jpeg(&dir);
    let mut bytes = fs::read(&clean).unwrap();
    bytes.extend_from_slice(b"---- hidden archive bytes ----");
    let tampered = dir.join("tampered.jpg");
    fs::write(&tampered, &bytes).unwrap();

    let report = analyze_file(&AppConfig::default(), &tampered).unwrap();
    assert!(report.forensics.stego.suspicious);
    assert!(report
        .forensics
        .stego
        .indicators
        .iter()
        .any(|i| i.contains("appended after")));
}

// ============================================================================
// Error handling
// ============================================================================

#[test]
fn non_image_bytes_are_rejected_not_panicked() {
    let dir = temp_dir("not_image");
    let path = dir.join("fake.png");
    fs::write(&path, b"The quick brown fox jumps over the lazy dog").unwrap();

    match analyze_file(&AppConfig::default(), &path) {
        Err(AppError::UnsupportedFormat(msg)) => assert!(msg.contains("fake.png")),
        other => panic!("expected UnsupportedFormat, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let err = analyze_file(
        &AppConfig::default(),
        &PathBuf::from("/nonexistent/image.jpg"),
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Io(_)));
}

// ============================================================================
// Export round trip
// ============================================================================

fn collect_leaves(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for v in map.values() {
                collect_leaves(v, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_leaves(item, out);
            }
        }
        Value::String(s) => out.push(s.clone()),
        other => out.push(other.to_string()),
    }
}

#[test]
fn json_and_text_exports_carry_the_same_fields() {
    let dir = temp_dir("round_trip");
    let path = write_sample_png(&dir);
    let report = analyze_file(&AppConfig::default(), &path).unwrap();

    let json = JsonReportWriter.render(&report).unwrap();
    let text = TextReportWriter.render(&report).unwrap();

    let value: Value = serde_json::from_str(&json).unwrap();

    // Every category header appears in the text rendering.
    for category in value.as_object().unwrap().keys() {
        assert!(
            text.contains(&format!("=== {} ===", category.to_uppercase())),
            "category {} missing from text export",
            category
        );
    }

    // Every leaf value in the JSON appears somewhere in the text.
    let mut leaves = Vec::new();
    collect_leaves(&value, &mut leaves);
    assert!(!leaves.is_empty());
    for leaf in leaves {
        assert!(
            text.contains(&leaf),
            "value {:?} missing from text export",
            leaf
        );
    }

    // The JSON export deserializes back into the data model unchanged.
    let restored: AnalysisReport = serde_json::from_str(&json).unwrap();
    assert_eq!(
        serde_json::to_string(&restored).unwrap(),
        serde_json::to_string(&report).unwrap()
    );
}

#[test]
fn export_writes_final_files_only() {
    let dir = temp_dir("export_files");
    let path = write_sample_png(&dir);
    let report = analyze_file(&AppConfig::default(), &path).unwrap();

    let writers = writers_for(&["json".into(), "text".into()]).unwrap();
    let out_dir = dir.join("out");
    export_report(&out_dir, &writers, &report).unwrap();

    let names: Vec<String> = fs::read_dir(&out_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert!(names.contains(&"sample_metadata.json".to_string()));
    assert!(names.contains(&"sample_metadata_report.txt".to_string()));
    assert!(names.iter().all(|n| !n.ends_with(".tmp")));
}
