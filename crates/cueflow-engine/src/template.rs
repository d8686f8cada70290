//! Time placeholders in literal string values.
//!
//! `${timestamp}` expands to `YYYYMMDDhhmmss` and `${HHmmss}` to `hhmmss`,
//! both in local time. Only top-level literal strings are expanded;
//! symbolic references are left for resolution.

use chrono::{DateTime, Local};
use cueflow_config::{StepData, SymbolicRef};
use serde_json::Value;

pub const TIMESTAMP_PLACEHOLDER: &str = "${timestamp}";
pub const TIME_PLACEHOLDER: &str = "${HHmmss}";

/// Expand time placeholders in top-level literal strings using `now`.
pub fn substitute_templates(data: &StepData, now: DateTime<Local>) -> StepData {
  let timestamp = now.format("%Y%m%d%H%M%S").to_string();
  let time = now.format("%H%M%S").to_string();

  data
    .iter()
    .map(|(key, value)| {
      let value = match value {
        Value::String(s) if has_placeholder(s) && !SymbolicRef::is_reference(s) => Value::String(
          s.replace(TIMESTAMP_PLACEHOLDER, &timestamp)
            .replace(TIME_PLACEHOLDER, &time),
        ),
        other => other.clone(),
      };
      (key.clone(), value)
    })
    .collect()
}

fn has_placeholder(s: &str) -> bool {
  s.contains(TIMESTAMP_PLACEHOLDER) || s.contains(TIME_PLACEHOLDER)
}
