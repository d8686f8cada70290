use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::input::is_blank;

/// A directed connection between two nodes.
///
/// Endpoints are kept as raw JSON so that graphs coming straight from an
/// editor can be loaded and then rejected with a precise diagnostic by the
/// compiler, including endpoints that are not strings at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target: Option<Value>,
}

impl Edge {
  pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      source: Some(Value::String(source.into())),
      target: Some(Value::String(target.into())),
    }
  }

  /// Both endpoints, if both are present and not blank.
  pub fn endpoints(&self) -> Option<(&Value, &Value)> {
    match (self.source.as_ref(), self.target.as_ref()) {
      (Some(source), Some(target)) if !is_blank(source) && !is_blank(target) => {
        Some((source, target))
      }
      _ => None,
    }
  }
}
