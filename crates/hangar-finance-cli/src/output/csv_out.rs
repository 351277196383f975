use serde_json::Value;
use std::io;

use super::{flatten, payload};

type StdoutCsv<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// A payload with a yearly `series` is written one row per year; a
/// sensitivity `matrix` as a grid; anything else as field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let result = payload(value);

    let written = match (result.get("series"), result.get("matrix")) {
        (Some(Value::Array(rows)), _) => write_rows(&mut wtr, rows),
        (_, Some(Value::Array(matrix))) => write_matrix(&mut wtr, result, matrix),
        _ => write_fields(&mut wtr, result),
    };
    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {e}");
    }
}

fn write_fields(wtr: &mut StdoutCsv<'_>, value: &Value) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in flatten(value) {
        wtr.write_record([key, format_csv_value(&val)])?;
    }
    Ok(())
}

fn write_rows(wtr: &mut StdoutCsv<'_>, rows: &[Value]) -> csv::Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<String> = flatten(first).into_iter().map(|(k, _)| k).collect();
    wtr.write_record(&headers)?;

    for row in rows {
        let cells = flatten(row);
        let record: Vec<String> = headers
            .iter()
            .map(|h| {
                cells
                    .iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| format_csv_value(v))
                    .unwrap_or_default()
            })
            .collect();
        wtr.write_record(&record)?;
    }
    Ok(())
}

/// Sensitivity grid: first column holds variable 1, header row variable 2.
fn write_matrix(wtr: &mut StdoutCsv<'_>, result: &Value, matrix: &[Value]) -> csv::Result<()> {
    let empty = Vec::new();
    let v1 = result
        .get("variable1Values")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let v2 = result
        .get("variable2Values")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let corner = format!(
        "{} \\ {}",
        result.get("variable1Name").and_then(Value::as_str).unwrap_or(""),
        result.get("variable2Name").and_then(Value::as_str).unwrap_or("")
    );

    let mut header = vec![corner];
    header.extend(v2.iter().map(format_csv_value));
    wtr.write_record(&header)?;

    for (i, row) in matrix.iter().enumerate() {
        let mut record = vec![v1.get(i).map(format_csv_value).unwrap_or_default()];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(format_csv_value));
        }
        wtr.write_record(&record)?;
    }
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
