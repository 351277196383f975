use serde_json::Value;
use tabled::builder::Builder;

use super::{flatten, format_value, payload};

/// Arrays longer than this are summarised instead of printed inline
const INLINE_ARRAY_MAX: usize = 8;

/// Format output as tables: one Field/Value table for the scalar fields of
/// the payload, then one table per array of rows (e.g. the yearly series).
pub fn print_table(value: &Value) {
    let result = payload(value);

    match result {
        Value::Object(map) => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (key, val) in flatten(result) {
                match &val {
                    Value::Array(arr) if arr.first().is_some_and(Value::is_object) => {}
                    Value::Array(arr) if arr.len() > INLINE_ARRAY_MAX => {
                        builder.push_record([key, format!("({} values)", arr.len())]);
                    }
                    _ => builder.push_record([key, format_value(&val)]),
                }
            }
            println!("{}", builder.build());

            for (key, val) in map {
                if let Value::Array(rows) = val {
                    if rows.first().is_some_and(Value::is_object) {
                        println!("\n{key}:");
                        print_rows(rows);
                    }
                }
            }
        }
        Value::Array(rows) => print_rows(rows),
        _ => println!("{}", format_value(result)),
    }

    print_envelope_notes(value);
}

fn print_rows(rows: &[Value]) {
    let Some(first) = rows.first() else {
        println!("(empty)");
        return;
    };

    let headers: Vec<String> = flatten(first).into_iter().map(|(k, _)| k).collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows {
        let cells = flatten(row);
        let record: Vec<String> = headers
            .iter()
            .map(|h| {
                cells
                    .iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| format_number(v))
                    .unwrap_or_default()
            })
            .collect();
        builder.push_record(record);
    }
    println!("{}", builder.build());
}

/// Two decimals for wide numeric tables; integers as-is.
fn format_number(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(|f| format!("{f:.2}"))
            .unwrap_or_else(|| n.to_string()),
        _ => format_value(value),
    }
}

fn print_envelope_notes(value: &Value) {
    let Some(envelope) = value.as_object() else {
        return;
    };

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
