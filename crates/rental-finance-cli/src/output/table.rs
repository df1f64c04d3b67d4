use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten_row, format_cell, result_of, split_rows};

/// Format output as tables: scalar fields first, then one row per unit,
/// month or cash-flow point.
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Object(result) => {
            print_result(result);
            if let Value::Object(envelope) = value {
                print_envelope_notes(envelope);
            }
        }
        other => println!("{}", format_cell(other)),
    }
}

fn print_result(result: &Map<String, Value>) {
    let (scalars, rows) = split_rows(result);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in scalars {
        builder.push_record([key.to_string(), format_cell(val)]);
    }
    println!("{}", Table::from(builder));

    if let Some((name, items)) = rows {
        println!("\n{name}:");
        print_rows(items);
    }
}

fn print_rows(items: &[Value]) {
    let Some(first) = items.first() else {
        println!("(empty)");
        return;
    };
    let headers: Vec<String> = flatten_row(first).into_iter().map(|(k, _)| k).collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for item in items {
        let cells = flatten_row(item);
        let row: Vec<String> = headers
            .iter()
            .map(|h| {
                cells
                    .iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default()
            })
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}
