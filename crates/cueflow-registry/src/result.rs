use cueflow_bus::CommandError;
use cueflow_config::StepData;
use serde::{Deserialize, Serialize};

/// Outcome of a single step invocation.
///
/// A failed result carries a human-readable `error` and, when the failure
/// has a stable identity, a machine-readable `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
  pub ok: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<StepData>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub code: Option<String>,
}

impl StepResult {
  pub fn success(data: StepData) -> Self {
    Self {
      ok: true,
      data: Some(data),
      error: None,
      code: None,
    }
  }

  pub fn failure(code: impl Into<String>, error: impl Into<String>) -> Self {
    Self {
      ok: false,
      data: None,
      error: Some(error.into()),
      code: Some(code.into()),
    }
  }

  /// Failure without a machine-readable code.
  pub fn message(error: impl Into<String>) -> Self {
    Self {
      ok: false,
      data: None,
      error: Some(error.into()),
      code: None,
    }
  }

  /// The result's data, or an empty mapping.
  pub fn data_or_empty(&self) -> StepData {
    self.data.clone().unwrap_or_default()
  }
}

impl From<CommandError> for StepResult {
  fn from(err: CommandError) -> Self {
    StepResult::failure(err.code(), err.to_string())
  }
}
