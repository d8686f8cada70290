use cueflow_config::StepData;
use cueflow_registry::StepResult;
use serde_json::Value;

use crate::INVALID_INPUT;

/// A non-empty string field, or an `INVALID_INPUT` failure.
pub(crate) fn required_str<'a>(data: &'a StepData, field: &str) -> Result<&'a str, StepResult> {
  match data.get(field) {
    Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
    Some(Value::String(_)) | None | Some(Value::Null) => Err(StepResult::failure(
      INVALID_INPUT,
      format!("'{}' is required", field),
    )),
    Some(other) => Err(StepResult::failure(
      INVALID_INPUT,
      format!("'{}' must be a string, got {}", field, other),
    )),
  }
}

/// A string field that falls back to `default` when absent or blank.
pub(crate) fn str_or<'a>(data: &'a StepData, field: &str, default: &'a str) -> &'a str {
  data
    .get(field)
    .and_then(|v| v.as_str())
    .filter(|s| !s.trim().is_empty())
    .unwrap_or(default)
}

/// Convert a bus reply into step data. Non-object replies are wrapped under `result`.
pub(crate) fn reply_data(reply: Value) -> StepData {
  match reply {
    Value::Object(map) => map,
    Value::Null => StepData::new(),
    other => {
      let mut data = StepData::new();
      data.insert("result".to_string(), other);
      data
    }
  }
}
