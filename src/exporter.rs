use crate::error::AppError;
use crate::metadata::AnalysisReport;
use crate::report::ReportWriter;
use std::fs;
use std::path::Path;

/// Batch stage: drain analysis reports and export each through the
/// configured writers.
pub fn start_exporting(
    output_directory: &Path,
    writers: &[Box<dyn ReportWriter>],
    reports_rx: crossbeam_channel::Receiver<AnalysisReport>,
) -> Result<(), AppError> {
    log::info!("Exporting reports to {}", output_directory.display());

    let mut exported = 0usize;
    for report in reports_rx {
        match export_report(output_directory, writers, &report) {
            Ok(()) => exported += 1,
            Err(e) => log::warn!(
                "Failed to export report for {}: {}",
                report.file_info.file_name,
                e
            ),
        }
    }

    log::info!("Exported {} reports.", exported);
    Ok(())
}

/// Write one report through every writer. Each file is written to a
/// temporary name and renamed into place, so a failed export leaves no
/// partial file behind.
pub fn export_report(
    output_directory: &Path,
    writers: &[Box<dyn ReportWriter>],
    report: &AnalysisReport,
) -> Result<(), AppError> {
    if !output_directory.exists() {
        fs::create_dir_all(output_directory)?;
    }

    let stem = Path::new(&report.file_info.file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| report.file_info.file_name.clone());

    for writer in writers {
        let rendered = writer.render(report)?;
        let final_path = output_directory.join(writer.file_name(&stem));
        let tmp_path = output_directory.join(format!(".{}.tmp", writer.file_name(&stem)));

        if let Err(e) = fs::write(&tmp_path, rendered.as_bytes()) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp_path, &final_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        log::info!("Report written to {}", final_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::processor::analyze_file;
    use crate::report::writers_for;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "image_forensics_export_{}_{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn exports_both_formats_without_leftover_temp_files() {
        let dir = temp_dir("both");
        let source = dir.join("pic.png");
        RgbImage::from_pixel(16, 16, Rgb([10, 20, 30]))
            .save(&source)
            .unwrap();

        let report = analyze_file(&AppConfig::default(), &source).unwrap();
        let writers = writers_for(&["json".into(), "text".into()]).unwrap();
        let out_dir = dir.join("reports");
        export_report(&out_dir, &writers, &report).unwrap();

        assert!(out_dir.join("pic_metadata.json").exists());
        assert!(out_dir.join("pic_metadata_report.txt").exists());
        let leftovers: Vec<_> = fs::read_dir(&out_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
