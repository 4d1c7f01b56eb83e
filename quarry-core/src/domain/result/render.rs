// quarry-core/src/domain/result/render.rs

use serde_json::Value;

/// Text shown in one result cell.
///
/// Null reads as `NULL`, strings are shown bare, nested values as compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
