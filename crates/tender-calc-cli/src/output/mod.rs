pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The comparison matrix inside a `compare` envelope, if this is one.
pub(crate) fn find_matrix(value: &Value) -> Option<&serde_json::Map<String, Value>> {
    value
        .get("result")
        .and_then(|r| r.get("matrix"))
        .and_then(Value::as_object)
        .filter(|m| m.contains_key("rows") && m.contains_key("scheme_codes"))
}

/// Column headers and (metric name, label, cells) rows of a matrix.
pub(crate) fn matrix_parts(
    matrix: &serde_json::Map<String, Value>,
) -> (Vec<String>, Vec<(String, String, Vec<String>)>) {
    let codes: Vec<String> = matrix
        .get("scheme_codes")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(|c| c.as_str().map(String::from)).collect())
        .unwrap_or_default();

    let rows = matrix
        .get("rows")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    let metric = row.get("metric").and_then(Value::as_str).unwrap_or_default();
                    let label = row.get("label").and_then(Value::as_str).unwrap_or(metric);
                    let cells = row
                        .get("values")
                        .and_then(Value::as_array)
                        .map(|vals| {
                            vals.iter()
                                .map(|v| {
                                    v.as_str().map(String::from).unwrap_or_else(|| v.to_string())
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    (metric.to_string(), label.to_string(), cells)
                })
                .collect()
        })
        .unwrap_or_default();

    (codes, rows)
}
