use crate::error::AppError;
use crate::metadata::AnalysisReport;
use crate::report::ReportWriter;
use serde_json::Value;

/// Text export: a flattened rendering of the same record the JSON writer
/// serializes. Sections and fields are emitted by walking the serialized
/// form, so the two outputs always carry the same data.
pub struct TextReportWriter;

const BANNER_WIDTH: usize = 60;

impl ReportWriter for TextReportWriter {
    fn format_name(&self) -> &'static str {
        "text"
    }

    fn file_name(&self, stem: &str) -> String {
        format!("{}_metadata_report.txt", stem)
    }

    fn render(&self, report: &AnalysisReport) -> Result<String, AppError> {
        let value = serde_json::to_value(report)?;
        let mut out = String::new();
        out.push_str(&"=".repeat(BANNER_WIDTH));
        out.push('\n');
        out.push_str("IMAGE METADATA FORENSIC REPORT\n");
        out.push_str(&"=".repeat(BANNER_WIDTH));
        out.push_str("\n\n");

        if let Value::Object(categories) = value {
            for (category, body) in categories {
                out.push_str(&format!("=== {} ===\n", category.to_uppercase()));
                render_value(&mut out, 0, &body);
                out.push('\n');
            }
        }
        Ok(out)
    }
}

/// True for the `{tag, value}` / `{algorithm, digest}` pair objects used in
/// ordered lists; they flatten to a single line.
fn as_pair(value: &Value) -> Option<(String, String)> {
    let obj = value.as_object()?;
    if obj.len() != 2 {
        return None;
    }
    for (name_key, value_key) in [("tag", "value"), ("algorithm", "digest")] {
        if let (Some(Value::String(name)), Some(val)) = (obj.get(name_key), obj.get(value_key))
        {
            return Some((name.clone(), scalar_text(val)));
        }
    }
    None
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn humanize(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn render_value(out: &mut String, depth: usize, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                render_entry(out, depth, key, val);
            }
        }
        Value::Array(items) => {
            for item in items {
                render_list_item(out, depth, item);
            }
        }
        scalar => {
            indent(out, depth);
            out.push_str(&scalar_text(scalar));
            out.push('\n');
        }
    }
}

fn render_entry(out: &mut String, depth: usize, key: &str, value: &Value) {
    match value {
        Value::Object(_) => {
            indent(out, depth);
            out.push_str(&format!("{}:\n", humanize(key)));
            render_value(out, depth + 1, value);
        }
        Value::Array(items) => {
            indent(out, depth);
            out.push_str(&format!("{}:\n", humanize(key)));
            for item in items {
                render_list_item(out, depth + 1, item);
            }
        }
        scalar => {
            indent(out, depth);
            out.push_str(&format!("{}: {}\n", humanize(key), scalar_text(scalar)));
        }
    }
}

fn render_list_item(out: &mut String, depth: usize, item: &Value) {
    if let Some((name, value)) = as_pair(item) {
        indent(out, depth);
        out.push_str(&format!("{}: {}\n", name, value));
        return;
    }
    match item {
        Value::Object(_) => render_value(out, depth, item),
        scalar => {
            indent(out, depth);
            out.push_str(&format!("- {}\n", scalar_text(scalar)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanize_keys() {
        assert_eq!(humanize("file_name"), "File Name");
        assert_eq!(humanize("mean_difference"), "Mean Difference");
        assert_eq!(humanize("iso_speed"), "Iso Speed");
    }

    #[test]
    fn pair_objects_flatten() {
        let pair = serde_json::json!({"tag": "Orientation", "value": "row 0 at top"});
        assert_eq!(
            as_pair(&pair),
            Some(("Orientation".to_string(), "row 0 at top".to_string()))
        );
        let digest = serde_json::json!({"algorithm": "SHA256", "digest": "abcd"});
        assert_eq!(
            as_pair(&digest),
            Some(("SHA256".to_string(), "abcd".to_string()))
        );
        let other = serde_json::json!({"a": 1, "b": 2, "c": 3});
        assert_eq!(as_pair(&other), None);
    }
}
