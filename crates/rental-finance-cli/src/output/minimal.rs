use serde_json::Value;

use super::{format_cell, result_of};

/// Headline figure of each calculator, in the order they are tried.
const HEADLINE_KEYS: [&str; 8] = [
    "tax_owed",
    "total_tax_owed",
    "total_payable",
    "owner_total",
    "physical_pct",
    "annual_yield_pct",
    "total_projected",
    "version",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(result_of(value)));
}

fn headline(result: &Value) -> String {
    if let Value::Object(map) = result {
        if let Some(val) = HEADLINE_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|val| !val.is_null())
        {
            return format_cell(val);
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{key}: {}", format_cell(val));
        }
    }
    format_cell(result)
}
