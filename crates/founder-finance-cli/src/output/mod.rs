pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Result fields holding a per-month or per-item series, in display order.
pub const SERIES_KEYS: [&str; 6] = [
    "trajectory",
    "breakdown",
    "monthly_deltas",
    "stakeholders",
    "scenarios",
    "employees",
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a serialized `Runway` (`{"kind": "months", "months": "14.2"}` or
/// `{"kind": "infinite"}`) as text. `None` for any other value.
pub fn render_runway(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    match map.get("kind")?.as_str()? {
        "infinite" => Some("Infinite".to_string()),
        "months" => {
            let months = match map.get("months")? {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(format!("{months} months"))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_runway() {
        assert_eq!(
            render_runway(&json!({"kind": "months", "months": "13"})),
            Some("13 months".to_string())
        );
        assert_eq!(render_runway(&json!({"kind": "infinite"})), Some("Infinite".to_string()));
        assert_eq!(render_runway(&json!({"kind": "other"})), None);
        assert_eq!(render_runway(&json!("13")), None);
    }
}
