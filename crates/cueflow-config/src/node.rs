use serde::{Deserialize, Serialize};

use crate::input::StepData;

/// A typed unit of work in a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub id: String,
  #[serde(rename = "type")]
  pub node_type: String,
  #[serde(default)]
  pub data: StepData,
}

impl Node {
  pub fn new(id: impl Into<String>, node_type: impl Into<String>, data: StepData) -> Self {
    Self {
      id: id.into(),
      node_type: node_type.into(),
      data,
    }
  }
}
