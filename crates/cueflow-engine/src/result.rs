use cueflow_compiler::{Issue, Plan};
use cueflow_config::StepData;
use cueflow_registry::StepResult;
use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
  !*value
}

/// How a step was handled in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
  Skipped,
  Replayed,
  Executed,
  Failed,
}

/// Per-step entry of an execution report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
  pub node: String,
  pub ok: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub result: Option<StepResult>,
  #[serde(default, skip_serializing_if = "is_false")]
  pub skipped: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
  #[serde(default, skip_serializing_if = "is_false")]
  pub idempotent: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub idem_key: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cached_result: Option<StepResult>,
  /// The data the handler was actually called with.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<StepData>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub code: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl StepOutcome {
  fn empty(node: &str, ok: bool) -> Self {
    Self {
      node: node.to_string(),
      ok,
      result: None,
      skipped: false,
      reason: None,
      idempotent: false,
      idem_key: None,
      cached_result: None,
      data: None,
      code: None,
      error: None,
    }
  }

  pub fn skipped(node: &str, reason: impl Into<String>) -> Self {
    Self {
      skipped: true,
      reason: Some(reason.into()),
      ..Self::empty(node, true)
    }
  }

  pub fn replayed(node: &str, idem_key: String, cached: StepResult) -> Self {
    Self {
      idempotent: true,
      idem_key: Some(idem_key),
      cached_result: Some(cached),
      ..Self::empty(node, true)
    }
  }

  pub fn executed(node: &str, idem_key: String, result: StepResult, data: StepData) -> Self {
    let ok = result.ok;
    Self {
      result: Some(result),
      idem_key: Some(idem_key),
      data: Some(data),
      ..Self::empty(node, ok)
    }
  }

  /// A step stopped before its handler ran.
  pub fn failed(node: &str, code: impl Into<String>, error: impl Into<String>) -> Self {
    Self {
      code: Some(code.into()),
      error: Some(error.into()),
      ..Self::empty(node, false)
    }
  }

  pub fn status(&self) -> StepStatus {
    if self.skipped {
      StepStatus::Skipped
    } else if self.idempotent {
      StepStatus::Replayed
    } else if self.ok {
      StepStatus::Executed
    } else {
      StepStatus::Failed
    }
  }
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
  pub ok: bool,
  #[serde(default, skip_serializing_if = "is_false")]
  pub dry_run: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plan: Option<Plan>,
  pub results: Vec<StepOutcome>,
  pub stopped: bool,
  pub stop_at: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub errors: Vec<Issue>,
  pub execution_id: String,
  pub timestamp: String,
}

impl ExecutionReport {
  /// Outcome for a node, if the run reached it.
  pub fn outcome(&self, node_id: &str) -> Option<&StepOutcome> {
    self.results.iter().find(|r| r.node == node_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_outcome_wire_shapes() {
    assert_eq!(
      serde_json::to_value(StepOutcome::skipped("n1", "resume_from")).unwrap(),
      json!({ "node": "n1", "ok": true, "skipped": true, "reason": "resume_from" })
    );

    assert_eq!(
      serde_json::to_value(StepOutcome::failed("n2", "RESOLUTION_FAILED", "nope")).unwrap(),
      json!({ "node": "n2", "ok": false, "code": "RESOLUTION_FAILED", "error": "nope" })
    );

    let replayed = StepOutcome::replayed("n3", "abc".to_string(), StepResult::success(StepData::new()));
    assert_eq!(
      serde_json::to_value(&replayed).unwrap(),
      json!({
        "node": "n3",
        "ok": true,
        "idempotent": true,
        "idemKey": "abc",
        "cachedResult": { "ok": true, "data": {} }
      })
    );
    assert_eq!(replayed.status(), StepStatus::Replayed);
  }

  #[test]
  fn test_executed_failure_status() {
    let outcome = StepOutcome::executed(
      "n2",
      "k".to_string(),
      StepResult::failure("X", "boom"),
      StepData::new(),
    );
    assert!(!outcome.ok);
    assert_eq!(outcome.status(), StepStatus::Failed);
    assert_eq!(outcome.result.unwrap().code.as_deref(), Some("X"));
  }
}
