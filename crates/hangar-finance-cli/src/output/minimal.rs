use serde_json::Value;

use super::{format_value, payload};

/// Headline fields, most informative first.
const PRIORITY_KEYS: [&str; 7] = [
    "irrPct",
    "irr",
    "paybackYears",
    "tarif",
    "baseCaseValue",
    "avgDscr",
    "totalCost",
];

/// Print just the key answer value from the output.
///
/// Looks for a headline field in the payload, then in its `kpis` block,
/// then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = payload(value);

    if let Value::Object(map) = result_obj {
        let kpis = map.get("kpis").and_then(Value::as_object);
        for key in &PRIORITY_KEYS {
            let hit = map.get(*key).or_else(|| kpis.and_then(|k| k.get(*key)));
            if let Some(val) = hit {
                if !val.is_null() {
                    println!("{}", format_value(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{key}: {}", format_value(val));
            return;
        }
    }

    println!("{}", format_value(result_obj));
}
