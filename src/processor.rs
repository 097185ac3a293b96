use crate::config::AppConfig;
use crate::ela;
use crate::error::AppError;
use crate::extractor;
use crate::format::{self, ImageKind};
use crate::hashing;
use crate::iptc;
use crate::metadata::{
    AnalysisReport, FileInfo, ForensicFindings, ImageProperties, human_readable_size,
};
use crate::stego;
use crate::xmp;
use chrono::{DateTime, Local};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Batch stage: drain discovered paths and analyze them in parallel.
/// Per-file failures are logged and skipped so one bad file never stops the
/// run.
pub fn start_processing(
    config: AppConfig,
    paths_rx: crossbeam_channel::Receiver<PathBuf>,
    reports_tx: crossbeam_channel::Sender<AnalysisReport>,
) -> Result<(), AppError> {
    log::info!("Starting image analysis with {} workers", config.num_workers);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_workers)
        .build()
        .map_err(|e| AppError::Generic(format!("Thread pool error: {}", e)))?;

    let paths: Vec<PathBuf> = paths_rx.iter().collect();
    log::info!("Received {} paths for analysis.", paths.len());

    pool.install(|| {
        paths.into_par_iter().try_for_each(|path| {
            match analyze_file(&config, &path) {
                Ok(report) => {
                    log::debug!("Analysis finished for {}", path.display());
                    reports_tx.send(report)?;
                    Ok::<(), AppError>(())
                }
                Err(e) => {
                    log::warn!("Failed to analyze {}: {}", path.display(), e);
                    Ok::<(), AppError>(())
                }
            }
        })
    })?;

    log::info!("All images analyzed.");
    Ok(())
}

/// Analyze a single image file into a complete report.
pub fn analyze_file(config: &AppConfig, path: &Path) -> Result<AnalysisReport, AppError> {
    log::debug!("Analyzing {}", path.display());
    let bytes = fs::read(path)?;

    let kind = format::detect_format(&bytes, path);
    if kind == ImageKind::Unknown {
        return Err(AppError::UnsupportedFormat(path.display().to_string()));
    }

    let mut warnings = Vec::new();
    let file_info = build_file_info(path, &bytes, kind);

    let algorithms = hashing::parse_algorithms(&config.hash_algorithms)?;
    let hashes = hashing::hash_bytes(&bytes, &algorithms);

    let extracted = extractor::extract(&bytes);
    warnings.extend(extracted.warnings);

    let iptc = iptc::extract(&bytes).filter(|info| !info.is_empty());

    let xmp_data = xmp::extract(&bytes);
    if let Some(warning) = xmp_data.warning {
        warnings.push(warning);
    }

    let mut image_properties = None;
    let mut ela_result = None;
    if kind.is_decodable() {
        match image::load_from_memory(&bytes) {
            Ok(img) => {
                image_properties = Some(build_image_properties(&img));
                match ela::analyze(&img, &config.ela) {
                    Ok(outcome) => {
                        if config.ela.save_visualization {
                            if let Err(e) = save_visualization(config, path, &outcome.visualization)
                            {
                                warnings.push(format!(
                                    "Could not save ELA visualization: {}",
                                    e
                                ));
                            }
                        }
                        ela_result = Some(outcome.result);
                    }
                    Err(e) => {
                        warnings.push(format!("Error level analysis unavailable: {}", e))
                    }
                }
            }
            Err(e) => warnings.push(format!("Could not decode pixel data: {}", e)),
        }
    } else {
        warnings.push(format!(
            "Pixel-level analysis not available for {} files",
            kind.label()
        ));
    }

    let stego = stego::scan(&bytes, kind);

    Ok(AnalysisReport {
        file_info,
        image_properties,
        camera: extracted.camera,
        device: extracted.device,
        dates: extracted.dates,
        gps: extracted.gps,
        exif_extra: extracted.extra,
        iptc,
        xmp: xmp_data.properties,
        forensics: ForensicFindings {
            hashes,
            ela: ela_result,
            stego,
            thumbnail_present: extracted.thumbnail_present,
        },
        warnings,
    })
}

fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%B %d, %Y at %H:%M:%S")
        .to_string()
}

#[cfg(unix)]
fn permissions_string(metadata: &fs::Metadata) -> Option<String> {
    use std::os::unix::fs::PermissionsExt;
    Some(format!("{:03o}", metadata.permissions().mode() & 0o777))
}

#[cfg(not(unix))]
fn permissions_string(metadata: &fs::Metadata) -> Option<String> {
    if metadata.permissions().readonly() {
        Some("read-only".to_string())
    } else {
        None
    }
}

fn build_file_info(path: &Path, bytes: &[u8], kind: ImageKind) -> FileInfo {
    let fs_metadata = fs::metadata(path).ok();
    let absolute = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf());

    FileInfo {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string()),
        file_path: absolute.display().to_string(),
        file_extension: path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_uppercase()),
        file_size: human_readable_size(bytes.len() as u64),
        file_size_bytes: bytes.len() as u64,
        created: fs_metadata
            .as_ref()
            .and_then(|m| m.created().ok())
            .map(format_timestamp),
        modified: fs_metadata
            .as_ref()
            .and_then(|m| m.modified().ok())
            .map(format_timestamp),
        accessed: fs_metadata
            .as_ref()
            .and_then(|m| m.accessed().ok())
            .map(format_timestamp),
        permissions: fs_metadata.as_ref().and_then(permissions_string),
        file_type: kind.label().to_string(),
        mime_type: format::mime_for(path, kind),
    }
}

fn build_image_properties(img: &image::DynamicImage) -> ImageProperties {
    let (width, height) = (img.width(), img.height());
    let color = img.color();
    ImageProperties {
        width,
        height,
        megapixels: format!("{:.2} MP", (width as f64 * height as f64) / 1_000_000.0),
        aspect_ratio: if height > 0 {
            format!("{:.2}:1", width as f64 / height as f64)
        } else {
            "n/a".to_string()
        },
        color_type: format!("{:?}", color),
        bits_per_pixel: (color.bytes_per_pixel() as u16) * 8,
        has_transparency: color.has_alpha(),
    }
}

fn save_visualization(
    config: &AppConfig,
    source: &Path,
    visualization: &image::GrayImage,
) -> Result<(), AppError> {
    let out_dir = Path::new(&config.output_directory);
    if !out_dir.exists() {
        fs::create_dir_all(out_dir)?;
    }
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    let out_path = out_dir.join(format!("{}_ela.png", stem));
    visualization.save(&out_path)?;
    log::info!("ELA visualization saved to {}", out_path.display());
    Ok(())
}
