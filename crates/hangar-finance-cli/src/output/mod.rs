pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};
use std::io::{self, Write};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Pretty-print JSON to stdout.
fn print_json(value: &Value) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = serde_json::to_writer_pretty(&mut out, value).and_then(|_| {
        writeln!(out).map_err(serde_json::Error::io)
    }) {
        eprintln!("JSON serialization error: {e}");
    }
}

/// The payload of a value: the `result` of a computation envelope, or the
/// value itself for bare outputs.
pub fn payload(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Flatten nested objects into dotted keys (`charges.totalCharges`).
/// Arrays are left as leaves.
pub fn flatten(value: &Value) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    if let Value::Object(map) = value {
        flatten_into("", map, &mut out);
    }
    out
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, out),
            _ => out.push((name, val.clone())),
        }
    }
}

/// Render a scalar for text output; `null` stays visible.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_unwraps_envelope() {
        let env = json!({ "result": { "irrPct": 9.1 }, "warnings": [] });
        assert_eq!(payload(&env), &json!({ "irrPct": 9.1 }));
        let bare = json!({ "tarif": "126000" });
        assert_eq!(payload(&bare), &bare);
    }

    #[test]
    fn test_flatten_dotted_keys() {
        let row = json!({ "year": 1, "charges": { "ifer": 2508.0, "totalCharges": 9000.0 }, "dscr": null });
        let keys: Vec<String> = flatten(&row).into_iter().map(|(k, _)| k).collect();
        assert!(keys.contains(&"charges.ifer".to_string()));
        assert!(keys.contains(&"charges.totalCharges".to_string()));
        assert!(keys.contains(&"dscr".to_string()));
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn test_format_value_keeps_null_visible() {
        assert_eq!(format_value(&Value::Null), "null");
        assert_eq!(format_value(&json!([1, 2])), "1, 2");
    }
}
