pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Result fields that hold one row per unit, month or cash-flow point.
const ROW_KEYS: [&str; 3] = ["distribution", "months", "points"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Split a result into its scalar fields and its row array, if it has one.
pub(crate) fn split_rows(
    result: &Map<String, Value>,
) -> (Vec<(&str, &Value)>, Option<(&str, &[Value])>) {
    let mut scalars = Vec::new();
    let mut rows = None;
    for (key, val) in result {
        match val {
            Value::Array(items) if rows.is_none() && ROW_KEYS.contains(&key.as_str()) => {
                rows = Some((key.as_str(), items.as_slice()));
            }
            _ => scalars.push((key.as_str(), val)),
        }
    }
    (scalars, rows)
}

/// Flatten nested objects one level deep into `parent.child` columns.
pub(crate) fn flatten_row(row: &Value) -> Vec<(String, String)> {
    let mut cells = Vec::new();
    if let Value::Object(map) = row {
        for (key, val) in map {
            match val {
                Value::Object(inner) => {
                    for (child, v) in inner {
                        cells.push((format!("{key}.{child}"), format_cell(v)));
                    }
                }
                _ => cells.push((key.clone(), format_cell(val))),
            }
        }
    }
    cells
}

pub(crate) fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_cell).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_rows_finds_distribution() {
        let value = json!({
            "result": {
                "owner_total": "10.00",
                "distribution": [{ "unit_id": "101", "share": "5.00" }],
                "strategy": "by_unit"
            }
        });
        let result = result_of(&value).as_object().unwrap();
        let (scalars, rows) = split_rows(result);
        assert_eq!(scalars.len(), 2);
        let (key, items) = rows.unwrap();
        assert_eq!(key, "distribution");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_flatten_row_prefixes_nested_fields() {
        let row = json!({ "period": "2024-03", "liability": { "tax_owed": "20.34" } });
        let cells = flatten_row(&row);
        assert!(cells.contains(&("period".to_string(), "2024-03".to_string())));
        assert!(cells.contains(&("liability.tax_owed".to_string(), "20.34".to_string())));
    }

    #[test]
    fn test_format_cell_null_is_blank() {
        assert_eq!(format_cell(&Value::Null), "");
        assert_eq!(format_cell(&json!(["a", "b"])), "a, b");
    }
}
