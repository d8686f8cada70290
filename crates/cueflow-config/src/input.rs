//! Step data values.
//!
//! Node data is an arbitrary JSON object. A field counts as provided when it
//! holds anything other than `null`, an empty string, an empty array, or an
//! empty object. `0` and `false` are real values.

use serde_json::Value;

/// Field name → value mapping carried by nodes and compiled steps.
pub type StepData = serde_json::Map<String, Value>;

/// Whether a field value should be treated as absent.
pub fn is_blank(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::String(s) => s.is_empty(),
    Value::Array(items) => items.is_empty(),
    Value::Object(map) => map.is_empty(),
    Value::Bool(_) | Value::Number(_) => false,
  }
}
