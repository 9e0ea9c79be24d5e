use serde_json::Value;

use super::render_runway;

/// Headline figures by priority. Dotted paths reach into nested objects.
const PRIORITY_PATHS: [&str; 10] = [
    "valuation",
    "runway",
    "final_credit",
    "best_round_name",
    "investor_ownership_percent",
    "summary.arr_24",
    "summary.ending_arr",
    "spread_at_24",
    "base.summary.arr_24",
    "current_valuation",
];

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, key| node.get(key))
}

/// Print just the headline answer from the output.
///
/// Looks for well-known result fields in order of priority, then falls back
/// to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    for path in PRIORITY_PATHS {
        if let Some(val) = lookup(result_obj, path) {
            if !val.is_null() {
                println!("{}", format_minimal(val));
                return;
            }
        }
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    if let Some(runway) = render_runway(value) {
        return runway;
    }
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_path() {
        let v = json!({"summary": {"arr_24": "1200000"}});
        assert_eq!(lookup(&v, "summary.arr_24"), Some(&json!("1200000")));
        assert_eq!(lookup(&v, "summary.missing"), None);
    }

    #[test]
    fn test_runway_renders_as_text() {
        assert_eq!(format_minimal(&json!({"kind": "infinite"})), "Infinite");
    }
}
