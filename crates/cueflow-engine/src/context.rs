use std::collections::HashMap;

use cueflow_config::StepData;
use serde::Serialize;
use serde_json::Value;

/// Output field exported from a generic `id` key when the step data has no
/// key of its own.
const OBJECT_ID: &str = "objectId";

/// Run-scoped outputs: node id → (output field → value).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExecutionContext {
  outputs: HashMap<String, StepData>,
}

impl ExecutionContext {
  pub fn new() -> Self {
    Self::default()
  }

  /// Whether the node has run (or been replayed) in this run.
  pub fn contains_node(&self, node_id: &str) -> bool {
    self.outputs.contains_key(node_id)
  }

  pub fn outputs(&self, node_id: &str) -> Option<&StepData> {
    self.outputs.get(node_id)
  }

  pub fn get(&self, node_id: &str, field: &str) -> Option<&Value> {
    self.outputs.get(node_id).and_then(|o| o.get(field))
  }

  /// Copy the declared outputs of a finished step out of its result data.
  ///
  /// Each (node, field) pair is written at most once; later exports for a
  /// pair already present are ignored. Declared outputs missing from the
  /// data are left unset.
  pub fn export(&mut self, node_id: &str, data: &StepData, declared: &[String]) {
    let exported = self.outputs.entry(node_id.to_string()).or_default();

    for field in declared {
      let value = match data.get(field) {
        Some(value) => value,
        None if field == OBJECT_ID => match data.get("id") {
          Some(value) => value,
          None => continue,
        },
        None => continue,
      };

      exported
        .entry(field.clone())
        .or_insert_with(|| value.clone());
    }
  }
}
