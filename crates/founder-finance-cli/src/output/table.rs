use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{render_runway, SERIES_KEYS};

/// Format output as tables using the tabled crate: headline fields first,
/// then one table per series (trajectory, breakdown, stakeholders, ...).
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{value}");
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    let Value::Object(res_map) = result else {
        print_flat_object(envelope);
        return;
    };

    print_flat_object(res_map);

    for key in SERIES_KEYS {
        if let Some(Value::Array(rows)) = res_map.get(key) {
            println!("\n{}:", key.replace('_', " "));
            print_array_table(rows);
        }
    }

    if let Some(Value::Array(insights)) = res_map.get("insights") {
        print_list("Insights", insights);
    }
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        print_list("Warnings", warnings);
    }
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

fn print_list(title: &str, items: &[Value]) {
    if items.is_empty() {
        return;
    }
    println!("\n{title}:");
    for item in items {
        if let Value::String(s) = item {
            println!("  - {s}");
        }
    }
}

/// Scalar and small nested fields as a two-column table. Series and
/// insights are printed separately.
fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if SERIES_KEYS.contains(&key.as_str()) || key == "insights" {
            continue;
        }
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    if let Some(runway) = render_runway(value) {
        return runway;
    }
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
