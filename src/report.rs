use crate::error::AppError;
use crate::metadata::AnalysisReport;
use crate::report_writers::{json::JsonReportWriter, text::TextReportWriter};

/// A report output backend. Writers render the full analysis record; the
/// exporter decides where the rendered bytes go.
pub trait ReportWriter: Send + Sync {
    /// Format name as used in configuration ("json", "text").
    fn format_name(&self) -> &'static str;

    /// Report file name for an input file stem.
    fn file_name(&self, stem: &str) -> String;

    /// Render the report. Must be a pure projection of the record.
    fn render(&self, report: &AnalysisReport) -> Result<String, AppError>;
}

/// Resolve configured format names into writers. Order follows the
/// configuration; duplicates collapse.
pub fn writers_for(formats: &[String]) -> Result<Vec<Box<dyn ReportWriter>>, AppError> {
    let mut writers: Vec<Box<dyn ReportWriter>> = Vec::new();
    for format in formats {
        let writer: Box<dyn ReportWriter> = match format.to_ascii_lowercase().as_str() {
            "json" => Box::new(JsonReportWriter),
            "text" | "txt" => Box::new(TextReportWriter),
            other => {
                return Err(AppError::Generic(format!(
                    "Unknown report format: {}",
                    other
                )))
            }
        };
        if !writers.iter().any(|w| w.format_name() == writer.format_name()) {
            writers.push(writer);
        }
    }
    Ok(writers)
}
