use cueflow_config::StepData;
use cueflow_registry::ContractSnapshot;
use serde::{Deserialize, Serialize};

/// One node, validated and ready to run.
///
/// `data` may still hold symbolic references; they are resolved by the
/// engine against the run's context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledStep {
  pub node_id: String,
  #[serde(rename = "type")]
  pub node_type: String,
  pub data: StepData,
  pub spec: ContractSnapshot,
}

/// Topologically ordered steps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
  steps: Vec<CompiledStep>,
}

impl Plan {
  pub fn new(steps: Vec<CompiledStep>) -> Self {
    Self { steps }
  }

  pub fn steps(&self) -> &[CompiledStep] {
    &self.steps
  }

  pub fn iter(&self) -> std::slice::Iter<'_, CompiledStep> {
    self.steps.iter()
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  pub fn get(&self, node_id: &str) -> Option<&CompiledStep> {
    self.steps.iter().find(|s| s.node_id == node_id)
  }

  /// Position of a node in the plan.
  pub fn position(&self, node_id: &str) -> Option<usize> {
    self.steps.iter().position(|s| s.node_id == node_id)
  }

  /// Node ids in plan order.
  pub fn node_ids(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.node_id.as_str()).collect()
  }
}

impl<'a> IntoIterator for &'a Plan {
  type Item = &'a CompiledStep;
  type IntoIter = std::slice::Iter<'a, CompiledStep>;

  fn into_iter(self) -> Self::IntoIter {
    self.steps.iter()
  }
}
