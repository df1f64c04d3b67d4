use serde_json::Value;
use std::io;

use super::{flatten_row, format_cell, result_of, split_rows};

/// Write output as CSV to stdout.
///
/// Results with a row array (apportionment shares, monthly tax, cash-flow
/// points) become one record per row; everything else is a `field,value`
/// listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    if let Err(e) = write_csv(&mut wtr, result_of(value)) {
        eprintln!("CSV write error: {e}");
    }
}

fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, result: &Value) -> csv::Result<()> {
    match result {
        Value::Object(map) => match split_rows(map) {
            (_, Some((_, items))) => write_rows(wtr, items)?,
            (scalars, None) => {
                wtr.write_record(["field", "value"])?;
                for (key, val) in scalars {
                    wtr.write_record([key, format_cell(val).as_str()])?;
                }
            }
        },
        Value::Array(items) => write_rows(wtr, items)?,
        other => wtr.write_record([format_cell(other)])?,
    }
    wtr.flush()?;
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, items: &[Value]) -> csv::Result<()> {
    let Some(first) = items.first() else {
        return Ok(());
    };
    let headers: Vec<String> = flatten_row(first).into_iter().map(|(k, _)| k).collect();
    wtr.write_record(&headers)?;
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
        wtr.write_record(&row)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv(&mut wtr, result_of(value)).unwrap();
        String::from_utf8(wtr.into_inner().ok().unwrap()).unwrap()
    }

    #[test]
    fn test_points_become_rows() {
        let value = json!({
            "result": {
                "points": [
                    {
                        "is_projection": false,
                        "period": "2024-05",
                        "projected": "0",
                        "realized": "7300"
                    },
                    {
                        "is_projection": true,
                        "period": "2024-06",
                        "projected": "7300",
                        "realized": "0"
                    }
                ],
                "total_projected": "7300"
            }
        });
        assert_eq!(
            render(&value),
            "is_projection,period,projected,realized\n\
             false,2024-05,0,7300\n\
             true,2024-06,7300,0\n"
        );
    }

    #[test]
    fn test_scalar_result_is_field_value() {
        let value = json!({ "result": { "days_late": 10, "penalty": "100.00" } });
        assert_eq!(render(&value), "field,value\ndays_late,10\npenalty,100.00\n");
    }
}
