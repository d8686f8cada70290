use std::collections::{BTreeMap, BTreeSet};

use cueflow_config::Node;
use cueflow_registry::StepRegistry;

/// Output field name → ids of the nodes whose contract declares it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducerIndex {
  producers: BTreeMap<String, BTreeSet<String>>,
}

impl ProducerIndex {
  /// Index every node of the graph. Nodes of unregistered types produce nothing.
  pub fn build<'a>(nodes: impl IntoIterator<Item = &'a Node>, registry: &StepRegistry) -> Self {
    let mut producers: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for node in nodes {
      let Some(contract) = registry.contract(&node.node_type) else {
        continue;
      };
      for output in &contract.outputs {
        producers
          .entry(output.clone())
          .or_default()
          .insert(node.id.clone());
      }
    }

    Self { producers }
  }

  /// Whether `node_id` produces `field`.
  pub fn produces(&self, node_id: &str, field: &str) -> bool {
    self
      .producers
      .get(field)
      .is_some_and(|ids| ids.contains(node_id))
  }

  /// Producers of a field, sorted.
  pub fn producers_of(&self, field: &str) -> impl Iterator<Item = &str> {
    self
      .producers
      .get(field)
      .into_iter()
      .flatten()
      .map(|id| id.as_str())
  }

  /// Nodes that could supply any of `fields`, excluding `node_id` itself. Sorted.
  pub fn suggestions(&self, fields: &[String], node_id: &str) -> Vec<String> {
    let suggestions: BTreeSet<&str> = fields
      .iter()
      .flat_map(|field| self.producers_of(field))
      .filter(|id| *id != node_id)
      .collect();
    suggestions.into_iter().map(|id| id.to_string()).collect()
  }
}
