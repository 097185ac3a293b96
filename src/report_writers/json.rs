use crate::error::AppError;
use crate::metadata::AnalysisReport;
use crate::report::ReportWriter;

/// JSON export: the serialized data model, nothing added or removed.
pub struct JsonReportWriter;

impl ReportWriter for JsonReportWriter {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn file_name(&self, stem: &str) -> String {
        format!("{}_metadata.json", stem)
    }

    fn render(&self, report: &AnalysisReport) -> Result<String, AppError> {
        let mut out = serde_json::to_string_pretty(report)?;
        out.push('\n');
        Ok(out)
    }
}
